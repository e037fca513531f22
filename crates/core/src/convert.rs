//! Image format conversion.
//!
//! This module re-encodes an in-memory image (carried as a data URL) into a
//! user-selected target format. The pipeline mirrors what a canvas-based
//! converter does: decode at natural dimensions, draw onto a fresh surface
//! (flattened onto white when the target has no alpha channel), then hand the
//! surface to the target format's encoder.
//!
//! All actual codec work is delegated to the `image` crate; nothing here
//! implements compression or container formats.

use crate::error::{AppError, Result};
use crate::sizing;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::error::ImageError;
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::str::FromStr;

/// Output encodings offered to the user.
///
/// Each variant maps 1:1 to a format menu entry and to one `image` crate
/// encoder. [`TargetFormat::Jpeg`] is the only one that consumes the quality
/// parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// Lossless raster (PNG). The default selection.
    Png,
    /// Lossy raster (JPEG), with adjustable quality.
    Jpeg,
    /// Uncompressed bitmap (BMP).
    Bmp,
    /// WebP (lossless as encoded by the `image` crate).
    WebP,
}

impl TargetFormat {
    /// All selectable formats, in menu order.
    pub const ALL: [TargetFormat; 4] = [
        TargetFormat::Png,
        TargetFormat::Jpeg,
        TargetFormat::Bmp,
        TargetFormat::WebP,
    ];

    /// Human-readable label for menus and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            TargetFormat::Png => "PNG",
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::Bmp => "BMP",
            TargetFormat::WebP => "WebP",
        }
    }

    /// File extension appended to the suggested download name.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::Bmp => "bmp",
            TargetFormat::WebP => "webp",
        }
    }

    /// Media type embedded in the produced data URL.
    pub fn media_type(&self) -> &'static str {
        match self {
            TargetFormat::Png => "image/png",
            TargetFormat::Jpeg => "image/jpeg",
            TargetFormat::Bmp => "image/bmp",
            TargetFormat::WebP => "image/webp",
        }
    }

    /// Whether the format can represent transparency. Formats without alpha
    /// get their transparent regions flattened onto opaque white.
    pub fn supports_alpha(&self) -> bool {
        matches!(self, TargetFormat::Png | TargetFormat::WebP)
    }

    /// Whether the quality parameter is meaningful for this format.
    pub fn uses_quality(&self) -> bool {
        matches!(self, TargetFormat::Jpeg)
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            TargetFormat::Png => ImageFormat::Png,
            TargetFormat::Jpeg => ImageFormat::Jpeg,
            TargetFormat::Bmp => ImageFormat::Bmp,
            TargetFormat::WebP => ImageFormat::WebP,
        }
    }
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(TargetFormat::Png),
            "jpeg" | "jpg" => Ok(TargetFormat::Jpeg),
            "bmp" => Ok(TargetFormat::Bmp),
            "webp" => Ok(TargetFormat::WebP),
            other => Err(format!("unknown target format: {other}")),
        }
    }
}

/// Parameters for a single conversion attempt.
#[derive(Clone, Copy, Debug)]
pub struct ConversionRequest {
    pub format: TargetFormat,
    /// Quality in `[0, 1]`; ignored unless `format` uses quality.
    pub quality: f32,
}

/// Outcome of a successful conversion.
#[derive(Clone, Debug)]
pub struct ConversionResult {
    /// The re-encoded image as a data URL, usable directly as a decode source.
    pub data_url: String,
    /// Estimated byte size of the encoded payload (see [`sizing`]).
    pub estimated_size: f64,
    /// Suggested download name: `<base name>.<target extension>`.
    pub file_name: String,
}

impl ConversionResult {
    /// Decodes the result's payload back into raw encoded-image bytes,
    /// e.g. for writing to disk.
    pub fn decoded_bytes(&self) -> Result<Vec<u8>> {
        decode_data_url(&self.data_url)
    }
}

/// Builds a data URL from a media type and raw encoded-image bytes.
pub fn encode_data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, BASE64.encode(bytes))
}

/// Extracts and decodes the base64 payload of a data URL.
///
/// # Errors
///
/// Returns [`AppError::DecodeFailed`] when the comma delimiter is missing or
/// the payload is not valid base64.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let payload = data_url
        .split_once(',')
        .map(|(_, payload)| payload)
        .ok_or_else(|| AppError::decode("malformed data URL (no payload delimiter)"))?;

    BASE64
        .decode(payload)
        .map_err(|e| AppError::decode(format!("invalid base64 payload: {e}")))
}

/// Re-encodes the image carried by `data_url` into the requested format.
///
/// The decoded image keeps its natural width and height; no scaling happens.
/// For alpha-incapable targets the pixels are composited onto opaque white
/// first, matching what a viewer would show against a white page.
///
/// # Errors
///
/// - [`AppError::DecodeFailed`] if the payload cannot be decoded as an image.
/// - [`AppError::UnsupportedFormat`] if no encoder exists for the target.
/// - [`AppError::Encoding`] for any other encoder failure.
///
/// A single attempt either produces a result or a terminal error; there are
/// no retries.
pub async fn convert(
    data_url: &str,
    base_name: &str,
    request: &ConversionRequest,
) -> Result<ConversionResult> {
    let bytes = decode_data_url(data_url)?;
    let decoded = image::load_from_memory(&bytes).map_err(|e| AppError::decode(e.to_string()))?;

    // The output surface has identical dimensions to the source. Formats
    // without an alpha channel would render transparent regions as black, so
    // those are pre-filled with opaque white.
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    let encoded = match request.format {
        TargetFormat::Jpeg => {
            let surface = flatten_onto_white(&decoded);
            let quality = jpeg_quality(request.quality);
            JpegEncoder::new_with_quality(&mut cursor, quality).encode_image(&surface)
        }
        format => {
            let surface = if format.supports_alpha() {
                DynamicImage::ImageRgba8(decoded.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(flatten_onto_white(&decoded))
            };
            surface.write_to(&mut cursor, format.image_format())
        }
    };

    encoded.map_err(|e| match e {
        ImageError::Unsupported(_) => {
            AppError::UnsupportedFormat(request.format.label().to_string())
        }
        other => AppError::encoding(other.to_string()),
    })?;

    let data_url = encode_data_url(request.format.media_type(), &buffer);
    let estimated_size = sizing::estimated_payload_bytes(&data_url);
    let file_name = format!("{}.{}", base_name, request.format.extension());

    Ok(ConversionResult {
        data_url,
        estimated_size,
        file_name,
    })
}

/// Maps the UI's `[0, 1]` quality to the JPEG encoder's 1–100 scale.
fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}

/// Composites an image onto an opaque white background.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut flattened = RgbImage::new(rgba.width(), rgba.height());

    for (src, dst) in rgba.pixels().zip(flattened.pixels_mut()) {
        let alpha = src[3] as u32;
        for channel in 0..3 {
            let blended = src[channel] as u32 * alpha + 255 * (255 - alpha);
            dst[channel] = ((blended + 127) / 255) as u8;
        }
    }

    flattened
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    /// A 4x4 RGBA PNG: top-left pixel fully transparent, the rest opaque red.
    fn sample_data_url() -> String {
        let image = RgbaImage::from_fn(4, 4, |x, y| {
            if x == 0 && y == 0 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([200, 30, 30, 255])
            }
        });

        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        encode_data_url("image/png", &bytes)
    }

    fn request(format: TargetFormat, quality: f32) -> ConversionRequest {
        ConversionRequest { format, quality }
    }

    #[tokio::test]
    async fn round_trip_preserves_dimensions() {
        let source = sample_data_url();
        for format in TargetFormat::ALL {
            let result = convert(&source, "photo", &request(format, 0.92))
                .await
                .unwrap();
            let decoded = image::load_from_memory(&result.decoded_bytes().unwrap()).unwrap();
            assert_eq!(decoded.dimensions(), (4, 4), "format {:?}", format);
        }
    }

    #[tokio::test]
    async fn suggested_file_name_appends_extension() {
        let source = sample_data_url();
        let result = convert(&source, "holiday.photo", &request(TargetFormat::Jpeg, 0.5))
            .await
            .unwrap();
        assert_eq!(result.file_name, "holiday.photo.jpeg");
    }

    #[tokio::test]
    async fn alpha_incapable_targets_flatten_to_white() {
        let source = sample_data_url();
        for format in [TargetFormat::Jpeg, TargetFormat::Bmp] {
            let result = convert(&source, "photo", &request(format, 0.92))
                .await
                .unwrap();
            let decoded = image::load_from_memory(&result.decoded_bytes().unwrap()).unwrap();
            let pixel = decoded.get_pixel(0, 0);
            // JPEG is lossy; accept near-white.
            for channel in 0..3 {
                assert!(pixel[channel] >= 240, "format {:?}, pixel {:?}", format, pixel);
            }
        }
    }

    #[tokio::test]
    async fn lossless_target_keeps_transparency() {
        let source = sample_data_url();
        let result = convert(&source, "photo", &request(TargetFormat::Png, 0.92))
            .await
            .unwrap();
        let decoded = image::load_from_memory(&result.decoded_bytes().unwrap()).unwrap();
        assert_eq!(decoded.get_pixel(0, 0)[3], 0);
    }

    #[tokio::test]
    async fn quality_changes_size_not_dimensions() {
        let source = sample_data_url();
        for quality in [0.1, 0.5, 1.0] {
            let result = convert(&source, "photo", &request(TargetFormat::Jpeg, quality))
                .await
                .unwrap();
            let decoded = image::load_from_memory(&result.decoded_bytes().unwrap()).unwrap();
            assert_eq!(decoded.dimensions(), (4, 4), "quality {quality}");
            assert!(result.estimated_size > 0.0);
        }
    }

    #[tokio::test]
    async fn estimated_size_matches_payload_arithmetic() {
        let source = sample_data_url();
        let result = convert(&source, "photo", &request(TargetFormat::Png, 0.92))
            .await
            .unwrap();
        let exact = result.decoded_bytes().unwrap().len() as f64;
        // The 4/3 arithmetic is exact up to the padding correction.
        assert!((result.estimated_size - exact).abs() < 1.0);
    }

    #[tokio::test]
    async fn corrupt_payload_is_a_decode_failure() {
        let source = "data:image/png;base64,aGVsbG8gd29ybGQ=";
        let err = convert(source, "photo", &request(TargetFormat::Png, 0.92))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DecodeFailed(_)), "got {err:?}");
    }

    #[test]
    fn data_url_without_comma_is_rejected() {
        assert!(matches!(
            decode_data_url("garbage"),
            Err(AppError::DecodeFailed(_))
        ));
    }

    #[test]
    fn jpeg_quality_maps_to_encoder_scale() {
        assert_eq!(jpeg_quality(0.92), 92);
        assert_eq!(jpeg_quality(0.0), 1); // encoder floor
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(2.0), 100);
    }

    #[test]
    fn flatten_blends_against_white() {
        let mut image = RgbaImage::new(1, 2);
        image.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        image.put_pixel(0, 1, Rgba([100, 100, 100, 255]));

        let flattened = flatten_onto_white(&DynamicImage::ImageRgba8(image));
        assert_eq!(flattened.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(flattened.get_pixel(0, 1).0, [100, 100, 100]);
    }
}
