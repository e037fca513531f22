//! File ingestion.
//!
//! Turns a user-picked file (from a dialog, a drag & drop event, or a CLI
//! argument) into an in-memory [`Session`]: the encoded bytes as a data URL
//! plus the metadata the UI displays. Validation happens before any bytes are
//! read; the read itself is the one genuinely asynchronous step.

use crate::convert::encode_data_url;
use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Declared media types recognized from file extensions.
///
/// These mirror what desktop environments and browsers report for the same
/// extensions; the declared type is what gets validated, not the content.
const EXTENSION_MEDIA_TYPES: [(&str, &str); 11] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("ico", "image/x-icon"),
    ("svg", "image/svg+xml"),
    ("avif", "image/avif"),
];

/// Maps a file name's extension to its declared media type.
///
/// Unknown or missing extensions yield `application/octet-stream`, which the
/// ingest validation then rejects.
pub fn media_type_for(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension {
        Some(ext) => EXTENSION_MEDIA_TYPES
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, media_type)| *media_type)
            .unwrap_or("application/octet-stream"),
        None => "application/octet-stream",
    }
}

/// Where a picked file's bytes come from.
#[derive(Clone, Debug)]
enum FileSource {
    /// A path on disk, read asynchronously during ingestion.
    Path(PathBuf),
    /// Bytes already in memory (e.g. a drag & drop payload).
    Memory(Arc<[u8]>),
}

/// A user-supplied file handle: a display name, a declared media type, and a
/// source of bytes. This is the single input of [`ingest`].
#[derive(Clone, Debug)]
pub struct PickedFile {
    pub name: String,
    pub media_type: String,
    source: FileSource,
}

impl PickedFile {
    /// Builds a picked file from a filesystem path, deriving the declared
    /// media type from the extension.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();
        let media_type = media_type_for(&name).to_string();

        Self {
            name,
            media_type,
            source: FileSource::Path(path.to_path_buf()),
        }
    }

    /// Builds a picked file from bytes already in memory.
    pub fn from_memory(name: impl Into<String>, media_type: impl Into<String>, bytes: Arc<[u8]>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            source: FileSource::Memory(bytes),
        }
    }
}

/// The single live conversion session: one ingested image plus its metadata.
///
/// Created on successful ingestion, owned by the UI controller, and cleared
/// on reset. At most one session exists at a time.
#[derive(Clone, Debug)]
pub struct Session {
    /// The full encoded representation, usable directly as a decode source.
    pub data_url: String,
    /// Original file name, as picked.
    pub file_name: String,
    /// File name with the final dot-delimited extension stripped.
    pub base_name: String,
    /// Exact byte size of the original file.
    pub size_bytes: u64,
}

/// Validates and reads a picked file into a [`Session`].
///
/// # Errors
///
/// - [`AppError::InvalidType`] when the declared media type does not start
///   with `image/`. Checked before any bytes are read.
/// - [`AppError::Io`] when reading the file fails.
pub async fn ingest(file: PickedFile) -> Result<Session> {
    if !file.media_type.starts_with("image/") {
        return Err(AppError::InvalidType(file.media_type));
    }

    let bytes: Arc<[u8]> = match file.source {
        FileSource::Path(path) => tokio::fs::read(&path).await?.into(),
        FileSource::Memory(bytes) => bytes,
    };

    Ok(Session {
        data_url: encode_data_url(&file.media_type, &bytes),
        base_name: strip_extension(&file.name),
        file_name: file.name,
        size_bytes: bytes.len() as u64,
    })
}

/// Strips the final dot-delimited extension segment from a file name.
/// Names without a dot are returned unchanged.
fn strip_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base.to_string(),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Arc<[u8]> {
        use image::{DynamicImage, ImageFormat, RgbaImage};
        use std::io::Cursor;

        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::new(2, 2))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes.into()
    }

    #[tokio::test]
    async fn valid_image_produces_session() {
        let bytes = png_bytes();
        let expected_size = bytes.len() as u64;
        let file = PickedFile::from_memory("holiday.photo.png", "image/png", bytes);

        let session = ingest(file).await.unwrap();
        assert_eq!(session.file_name, "holiday.photo.png");
        assert_eq!(session.base_name, "holiday.photo");
        assert_eq!(session.size_bytes, expected_size);
        assert!(session.data_url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn non_image_media_type_is_rejected() {
        let file = PickedFile::from_memory("notes.txt", "text/plain", Arc::from(&b"hello"[..]));
        let err = ingest(file).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidType(t) if t == "text/plain"));
    }

    #[tokio::test]
    async fn missing_path_surfaces_io_error() {
        let file = PickedFile::from_path(Path::new("/nonexistent/image.png"));
        let err = ingest(file).await.unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[tokio::test]
    async fn path_reads_go_through_the_filesystem() {
        let path = std::env::temp_dir().join("img_drop_ingest_test.png");
        let bytes = png_bytes();
        std::fs::write(&path, &bytes).unwrap();

        let session = ingest(PickedFile::from_path(&path)).await.unwrap();
        assert_eq!(session.size_bytes, bytes.len() as u64);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn media_types_follow_extensions() {
        assert_eq!(media_type_for("a.PNG"), "image/png");
        assert_eq!(media_type_for("a.jpg"), "image/jpeg");
        assert_eq!(media_type_for("archive.tar.gz"), "application/octet-stream");
        assert_eq!(media_type_for("no_extension"), "application/octet-stream");
    }

    #[test]
    fn extension_stripping() {
        assert_eq!(strip_extension("photo.png"), "photo");
        assert_eq!(strip_extension("holiday.photo.png"), "holiday.photo");
        assert_eq!(strip_extension("no_extension"), "no_extension");
        assert_eq!(strip_extension(".hidden"), ".hidden");
    }
}
