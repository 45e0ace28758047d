use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    console::config::ConsoleConfig, coordinate::config::StepCalibration, error::ConfigError,
    grid::config::GridSpec, jog::config::JogConfig, sequencer::config::SequencerConfig,
    session::config::SpeedConfig, simulator::config::SimulatorConfig,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub calibration: StepCalibration,
    pub sequencer: SequencerConfig,
    pub jog: JogConfig,
    pub grid: GridSpec,
    pub speeds: SpeedConfig,
    pub simulator: SimulatorConfig,
    pub console: ConsoleConfig,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        let per_mm = self.calibration.xy_steps_per_mm;
        if !(per_mm.is_finite() && per_mm > 0.0) {
            return invalid("calibration.xy_steps_per_mm must be positive");
        }
        if self.calibration.z_top_step <= self.calibration.z_bottom_step {
            return invalid("calibration.z_top_step must lie above z_bottom_step");
        }
        if self.sequencer.poll_interval_ms == 0 || self.sequencer.stop_timeout_ms == 0 {
            return invalid("sequencer poll interval and stop timeout must be non-zero");
        }
        if self.sequencer.home_clearance_steps <= 0 {
            return invalid("sequencer.home_clearance_steps must be positive");
        }
        if self.jog.tick_ms == 0 {
            return invalid("jog.tick_ms must be non-zero");
        }
        if self.jog.jog_steps <= 0 {
            return invalid("jog.jog_steps must be positive");
        }
        if self.grid.spacing_um <= 0.0 || self.grid.line_thickness_um < 0.0 {
            return invalid("grid spacing must be positive and line thickness non-negative");
        }
        if self.simulator.speed == 0 || self.simulator.min_travel >= self.simulator.max_travel {
            return invalid("simulator needs a non-zero speed and a non-empty travel");
        }
        if self.console.max_line_length == 0 || self.console.key_buffer == 0 {
            return invalid("console line length and key buffer must be non-zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"calibration": {{"xy_steps_per_mm": 4000.0}},
                "jog": {{"jog_steps": 1000}}, "speeds": {{"z": 900}}}}"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.calibration.xy_steps_per_mm, 4000.0);
        assert_eq!(config.calibration.z_top_step, 60_000);
        assert_eq!(config.jog.jog_steps, 1000);
        assert_eq!(config.jog.tick_ms, 50);
        assert_eq!(config.speeds.z, Some(900));
        assert_eq!(config.speeds.x, None);
        assert_eq!(config.sequencer.home_clearance_steps, 80_000);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"jog": {{"tick_ms": 0}}}}"#).unwrap();
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn unreadable_and_malformed_files_are_errors() {
        assert!(matches!(
            AppConfig::load("/nonexistent/discplace.json"),
            Err(ConfigError::Io(_))
        ));
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
