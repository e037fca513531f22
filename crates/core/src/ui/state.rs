//! UI state machine.
//!
//! [`Controller`] owns everything the converter window displays: the live
//! [`Session`], the selected format and quality, the latest result, and the
//! error banner. It is deliberately free of egui types so the full transition
//! table can be exercised in unit tests; the eframe app only renders it.

use crate::config::Config;
use crate::convert::{ConversionRequest, ConversionResult, TargetFormat};
use crate::error::AppError;
use crate::ingest::Session;

/// Which view the window is showing.
///
/// `Converting` layers the busy indicator over the conversion view; the error
/// banner is orthogonal to the phase and tracked separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No file loaded; the drop zone is visible.
    Landing,
    /// A file is loaded, no result shown.
    Ready,
    /// A conversion is in flight; the convert action is disabled.
    Converting,
    /// A result is shown below the conversion controls.
    ResultShown,
}

/// The UI state controller.
///
/// All user events funnel through the methods below; each one applies the
/// corresponding transition and nothing else. Rendering reads the fields.
pub struct Controller {
    pub phase: Phase,
    pub session: Option<Session>,
    pub target_format: TargetFormat,
    pub quality: f32,
    pub result: Option<ConversionResult>,
    error: Option<String>,
    generation: u64,
}

impl Controller {
    pub fn new(config: &Config) -> Self {
        Self {
            phase: Phase::Landing,
            session: None,
            target_format: config.default_format,
            quality: config.default_quality,
            result: None,
            error: None,
            generation: 0,
        }
    }

    /// Message for the error banner, if one is showing.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the quality slider is visible for the current format.
    pub fn quality_visible(&self) -> bool {
        self.target_format.uses_quality()
    }

    /// Whether the convert action is currently available.
    pub fn can_convert(&self) -> bool {
        self.session.is_some() && self.phase != Phase::Converting
    }

    /// Starts ingesting a newly picked file. Returns the generation tag the
    /// eventual [`Controller::file_ingested`] completion must carry.
    pub fn begin_ingest(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Applies the outcome of an ingest. Stale completions (issued before a
    /// newer ingest/convert/reset) are dropped; returns whether the event was
    /// applied.
    pub fn file_ingested(
        &mut self,
        generation: u64,
        outcome: Result<Session, AppError>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }

        match outcome {
            Ok(session) => {
                self.session = Some(session);
                self.result = None;
                self.error = None;
                self.phase = Phase::Ready;
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Selects a new target format, discarding any shown result.
    pub fn format_changed(&mut self, format: TargetFormat) {
        self.target_format = format;
        self.discard_result();
    }

    /// Adjusts the quality, discarding any shown result.
    pub fn quality_changed(&mut self, quality: f32) {
        self.quality = quality.clamp(0.0, 1.0);
        self.discard_result();
    }

    /// Starts a conversion if one can run. Returns the session data the
    /// worker needs plus the generation tag for the completion.
    pub fn begin_convert(&mut self) -> Option<(Session, ConversionRequest, u64)> {
        if !self.can_convert() {
            return None;
        }
        let session = self.session.clone()?;

        self.generation += 1;
        self.phase = Phase::Converting;
        self.result = None;

        let request = ConversionRequest {
            format: self.target_format,
            quality: self.quality,
        };
        Some((session, request, self.generation))
    }

    /// Applies the outcome of a conversion. Stale completions are dropped;
    /// returns whether the event was applied.
    pub fn conversion_finished(
        &mut self,
        generation: u64,
        outcome: Result<ConversionResult, AppError>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
                self.phase = Phase::ResultShown;
            }
            Err(e) => {
                self.result = None;
                self.error = Some(e.to_string());
                self.phase = Phase::Ready;
            }
        }
        true
    }

    /// Returns to the landing view, clearing the session, result and error
    /// and restoring the default format and quality.
    pub fn reset(&mut self, config: &Config) {
        self.generation += 1;
        self.phase = Phase::Landing;
        self.session = None;
        self.result = None;
        self.error = None;
        self.target_format = config.default_format;
        self.quality = config.default_quality;
    }

    fn discard_result(&mut self) {
        self.result = None;
        if self.phase == Phase::ResultShown {
            self.phase = Phase::Ready;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConversionResult;

    fn session() -> Session {
        Session {
            data_url: "data:image/png;base64,aGVsbG8=".to_string(),
            file_name: "photo.png".to_string(),
            base_name: "photo".to_string(),
            size_bytes: 5,
        }
    }

    fn result() -> ConversionResult {
        ConversionResult {
            data_url: "data:image/jpeg;base64,aGVsbG8=".to_string(),
            estimated_size: 5.0,
            file_name: "photo.jpeg".to_string(),
        }
    }

    #[test]
    fn full_interaction_scenario() {
        let config = Config::default();
        let mut controller = Controller::new(&config);
        assert_eq!(controller.phase, Phase::Landing);

        // Non-image file: error overlay, still landing.
        let generation = controller.begin_ingest();
        controller.file_ingested(
            generation,
            Err(AppError::InvalidType("text/plain".to_string())),
        );
        assert_eq!(controller.phase, Phase::Landing);
        assert!(controller.error().is_some());

        // Valid image: ready, error cleared.
        let generation = controller.begin_ingest();
        controller.file_ingested(generation, Ok(session()));
        assert_eq!(controller.phase, Phase::Ready);
        assert!(controller.error().is_none());

        // Convert: converting, then result shown.
        let (_, request, generation) = controller.begin_convert().unwrap();
        assert_eq!(controller.phase, Phase::Converting);
        assert!(!controller.can_convert());
        assert_eq!(request.quality, 0.92);
        controller.conversion_finished(generation, Ok(result()));
        assert_eq!(controller.phase, Phase::ResultShown);

        // Format change hides the result.
        controller.format_changed(TargetFormat::Jpeg);
        assert_eq!(controller.phase, Phase::Ready);
        assert!(controller.result.is_none());
        assert!(controller.quality_visible());

        // Reset: back to landing with defaults restored.
        controller.quality_changed(0.3);
        controller.reset(&config);
        assert_eq!(controller.phase, Phase::Landing);
        assert!(controller.session.is_none());
        assert_eq!(controller.target_format, TargetFormat::Png);
        assert_eq!(controller.quality, 0.92);
    }

    #[test]
    fn quality_change_discards_result() {
        let config = Config::default();
        let mut controller = Controller::new(&config);
        let generation = controller.begin_ingest();
        controller.file_ingested(generation, Ok(session()));

        let (_, _, generation) = controller.begin_convert().unwrap();
        controller.conversion_finished(generation, Ok(result()));
        assert!(controller.result.is_some());

        controller.quality_changed(0.5);
        assert!(controller.result.is_none());
        assert_eq!(controller.phase, Phase::Ready);
    }

    #[test]
    fn conversion_failure_returns_to_ready_with_error() {
        let config = Config::default();
        let mut controller = Controller::new(&config);
        let generation = controller.begin_ingest();
        controller.file_ingested(generation, Ok(session()));

        let (_, _, generation) = controller.begin_convert().unwrap();
        controller.conversion_finished(
            generation,
            Err(AppError::UnsupportedFormat("WebP".to_string())),
        );
        assert_eq!(controller.phase, Phase::Ready);
        assert!(controller.error().unwrap().contains("WebP"));
    }

    #[test]
    fn stale_completions_are_dropped() {
        let config = Config::default();
        let mut controller = Controller::new(&config);
        let generation = controller.begin_ingest();
        controller.file_ingested(generation, Ok(session()));

        let (_, _, stale) = controller.begin_convert().unwrap();
        controller.reset(&config);

        assert!(!controller.conversion_finished(stale, Ok(result())));
        assert_eq!(controller.phase, Phase::Landing);
        assert!(controller.result.is_none());
    }

    #[test]
    fn convert_requires_a_session() {
        let config = Config::default();
        let mut controller = Controller::new(&config);
        assert!(controller.begin_convert().is_none());
    }
}
