use std::fs;
use std::path::Path;
use std::time::Duration;

use labsweep_core::{ErrorInfo, SweepError};
use serde::{Deserialize, Serialize};

/// Engine settings passed to [`crate::SweepEngine::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Fail the run when `init` leaves no station in the context.
    #[serde(default = "SweepConfig::default_require_station")]
    pub require_station: bool,
    /// Progress reporting settings.
    #[serde(default)]
    pub progress: ProgressConfig,
}

impl SweepConfig {
    const fn default_require_station() -> bool {
        true
    }

    /// Parses a YAML document; omitted fields take their defaults.
    pub fn from_yaml_slice(data: &[u8]) -> Result<Self, SweepError> {
        labsweep_core::from_yaml_slice(data).map_err(|err| {
            SweepError::Config(
                ErrorInfo::new("config-parse", "failed to parse sweep configuration")
                    .with_hint(err.info().message.clone()),
            )
        })
    }

    /// Reads and parses a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SweepError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            SweepError::Config(
                ErrorInfo::new("config-read", "failed to read sweep configuration")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        Self::from_yaml_slice(&bytes)
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            require_station: Self::default_require_station(),
            progress: ProgressConfig::default(),
        }
    }
}

/// Progress reporting during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Log progress and ETA while the run is going.
    #[serde(default = "ProgressConfig::default_enabled")]
    pub enabled: bool,
    /// Minimum seconds between two reports.
    #[serde(default = "ProgressConfig::default_report_interval_secs")]
    pub report_interval_secs: u64,
}

impl ProgressConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_report_interval_secs() -> u64 {
        60
    }

    /// `report_interval_secs` as a [`Duration`].
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            report_interval_secs: Self::default_report_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_takes_defaults() {
        let config = SweepConfig::from_yaml_slice(b"{}").expect("config");
        assert_eq!(config, SweepConfig::default());
        assert!(config.require_station);
        assert_eq!(config.progress.report_interval(), Duration::from_secs(60));
    }

    #[test]
    fn partial_progress_section_keeps_other_defaults() {
        let yaml = b"require_station: false\nprogress:\n  report_interval_secs: 5\n";
        let config = SweepConfig::from_yaml_slice(yaml).expect("config");
        assert!(!config.require_station);
        assert!(config.progress.enabled);
        assert_eq!(config.progress.report_interval_secs, 5);
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let err = SweepConfig::from_yaml_slice(b"require_station: [").expect_err("bad yaml");
        assert_eq!(err.code(), "config-parse");
        assert!(matches!(err, SweepError::Config(_)));
        assert!(err.info().hint.is_some());
    }
}
