//! Error types for the img-drop-core library.
//!
//! This module provides granular error variants for different failure modes,
//! enabling precise error handling and user-friendly error messages.

use thiserror::Error;

/// Errors that can occur within the img-drop-core library.
///
/// Each variant represents a specific failure mode with contextual information
/// to help diagnose and handle errors appropriately. Every variant is non-fatal
/// from the UI's point of view: it is rendered in the error banner and the
/// interface stays interactive.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (invalid defaults, bad env values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The picked file's declared media type is not an image type.
    #[error("Please upload a valid image file (got media type \"{0}\")")]
    InvalidType(String),

    /// The encoded data could not be loaded as an image.
    #[error("Could not load the image for conversion: {0}")]
    DecodeFailed(String),

    /// No encoder is available for the requested target format.
    #[error("Conversion to {0} is not supported")]
    UnsupportedFormat(String),

    /// Re-encoding to the target format failed for a reason other than
    /// encoder availability.
    #[error("Image encoding failed: {0}")]
    Encoding(String),

    /// UI-related errors (window creation, event loop).
    #[error("UI error: {0}")]
    Ui(String),

    /// Standard I/O error (file read/write).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeFailed(msg.into())
    }

    /// Creates an encoding error with the given message.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Creates a UI error with the given message.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
