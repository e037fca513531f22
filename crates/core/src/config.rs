use crate::convert::TargetFormat;
use crate::error::{AppError, Result};
use dotenvy::dotenv;
use std::env;

/// Quality used for lossy output when nothing else is selected.
pub const DEFAULT_QUALITY: f32 = 0.92;

#[derive(Clone, Debug)]
pub struct Config {
    pub default_format: TargetFormat,
    pub default_quality: f32,
}

impl Config {
    /// Loads the configuration, applying optional environment overrides.
    ///
    /// `IMG_DROP_FORMAT` (png/jpeg/bmp/webp) and `IMG_DROP_QUALITY` (0.0–1.0)
    /// override the built-in defaults. A `.env` file is honored if present.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let default_format = match env::var("IMG_DROP_FORMAT") {
            Ok(value) => value.parse().map_err(AppError::config)?,
            Err(_) => TargetFormat::Png,
        };

        let default_quality = match env::var("IMG_DROP_QUALITY") {
            Ok(value) => {
                let quality: f32 = value
                    .parse()
                    .map_err(|_| AppError::config(format!("invalid IMG_DROP_QUALITY: {value}")))?;
                if !(0.0..=1.0).contains(&quality) {
                    return Err(AppError::config(format!(
                        "IMG_DROP_QUALITY must be in [0, 1], got {quality}"
                    )));
                }
                quality
            }
            Err(_) => DEFAULT_QUALITY,
        };

        Ok(Self {
            default_format,
            default_quality,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: TargetFormat::Png,
            default_quality: DEFAULT_QUALITY,
        }
    }
}
