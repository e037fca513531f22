//! img-drop Core Library
//!
//! This library provides the core functionality for the img-drop image
//! converter: file ingestion, format conversion, size reporting, and the
//! interactive drag-and-drop UI.
//!
//! # Overview
//!
//! img-drop lets a user load an image (drag & drop or file picker), preview
//! it, pick a target encoding — lossless PNG, lossy JPEG with adjustable
//! quality, uncompressed BMP, or WebP — and save the re-encoded result. The
//! library handles:
//!
//! - **Ingestion**: media-type validation and async file reads via [`ingest`]
//! - **Conversion**: decode → flatten → re-encode via [`convert`]
//! - **Size arithmetic**: payload estimation and formatting via [`sizing`]
//! - **User Interface**: the converter window via [`ui`]
//!
//! All codec work is delegated to the `image` crate; this library contains no
//! compression or container-format logic of its own.
//!
//! # Quick Start
//!
//! The simplest way to use the library is through the [`ImgDrop`] facade:
//!
//! ```ignore
//! use img_drop_core::{ImgDrop, TargetFormat};
//!
//! // Initialize with environment configuration
//! let app = ImgDrop::new()?;
//!
//! // Headless one-shot conversion
//! let result = app.convert_file("photo.png".as_ref(), TargetFormat::Jpeg, Some(0.8)).await?;
//!
//! // Or launch the interactive window
//! app.run_interactive()?;
//! ```
//!
//! # Module Structure
//!
//! - [`config`]: default format/quality and environment overrides
//! - [`convert`]: the conversion engine and target format table
//! - [`error`]: error types and result alias
//! - [`ingest`]: file validation and session creation
//! - [`sizing`]: byte estimation and human-readable formatting
//! - [`ui`]: the eframe application

pub mod config;
pub mod convert;
pub mod error;
pub mod ingest;
pub mod sizing;
pub mod ui;

// Re-export primary types for convenience
pub use config::Config;
pub use convert::{ConversionRequest, ConversionResult, TargetFormat};
pub use error::{AppError, Result};
pub use ingest::{PickedFile, Session};

use std::path::Path;

/// Main entry point for the img-drop application.
///
/// This struct provides a facade over the ingestion and conversion
/// subsystems. It's the recommended way to use the library for most use
/// cases.
///
/// # Example
///
/// ```ignore
/// use img_drop_core::ImgDrop;
///
/// let app = ImgDrop::new()?;
/// app.run_interactive()?;
/// ```
pub struct ImgDrop {
    config: Config,
}

impl ImgDrop {
    /// Creates a new instance with environment-based configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment override carries an invalid value.
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self { config })
    }

    /// Creates an instance with custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Ingests a file from disk and converts it in one step, without any UI.
    ///
    /// `quality` falls back to the configured default when `None`; it is only
    /// meaningful for quality-driven formats and ignored otherwise.
    ///
    /// # Errors
    ///
    /// Propagates ingestion errors ([`AppError::InvalidType`],
    /// [`AppError::Io`]) and conversion errors ([`AppError::DecodeFailed`],
    /// [`AppError::UnsupportedFormat`], [`AppError::Encoding`]).
    pub async fn convert_file(
        &self,
        path: &Path,
        format: TargetFormat,
        quality: Option<f32>,
    ) -> Result<ConversionResult> {
        let session = ingest::ingest(PickedFile::from_path(path)).await?;
        let request = ConversionRequest {
            format,
            quality: quality.unwrap_or(self.config.default_quality),
        };
        convert::convert(&session.data_url, &session.base_name, &request).await
    }

    /// Launches the interactive converter window and blocks until it closes.
    pub fn run_interactive(&self) -> Result<()> {
        ui::run_converter_ui(self.config.clone())
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before using any other functions.
/// This loads `.env` files if present and sets up the environment.
pub fn init() {
    let _ = dotenvy::dotenv();
}
