//! User interface for the image converter.
//!
//! The UI is split into focused submodules:
//! - [`state`]: the pure state machine driving everything on screen
//! - [`rendering`]: texture preparation and drop-zone drawing
//! - [`app`]: the eframe application and its worker threads
//!
//! # Usage
//!
//! ```ignore
//! use img_drop_core::{ui, Config};
//!
//! let config = Config::load()?;
//! ui::run_converter_ui(config)?;
//! ```

mod app;
mod rendering;
mod state;

// Public API exports
pub use app::ConverterApp;
pub use state::{Controller, Phase};

use crate::config::Config;
use crate::error::{AppError, Result};
use eframe::egui;

/// Launches the converter window and blocks until it closes.
///
/// # Errors
///
/// Returns [`AppError::Ui`] if the native window or event loop cannot be
/// created.
pub fn run_converter_ui(config: Config) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 760.0])
            .with_min_inner_size([480.0, 560.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Image Converter",
        options,
        Box::new(move |_cc| Ok(Box::new(ConverterApp::new(config)) as Box<dyn eframe::App>)),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {e}")))
}
