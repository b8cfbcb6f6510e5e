//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use swing_analysis::AnalysisConfig;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Wall-clock budget for one job
    pub job_timeout: Duration,
    /// Per-frame budget for pose detector calls
    pub detector_timeout: Duration,
    /// Attach the anchor/engine/whip projection to results
    pub include_legacy: bool,
    /// Body height after normalization
    pub canonical_height: f64,
    /// Install the Prometheus recorder
    pub metrics_enabled: bool,
    /// Where to write a metrics snapshot after each run
    pub metrics_dump_path: Option<PathBuf>,
    /// Emit JSON logs instead of ANSI text
    pub json_logs: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            job_timeout: Duration::from_secs(120),
            detector_timeout: Duration::from_millis(500),
            include_legacy: true,
            canonical_height: 1.0,
            metrics_enabled: false,
            metrics_dump_path: None,
            json_logs: false,
        }
    }
}

/// Parse an env var, keeping `default` when it is unset or malformed.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            job_timeout: Duration::from_secs(env_or(
                "SWING_JOB_TIMEOUT_SECS",
                defaults.job_timeout.as_secs(),
            )),
            detector_timeout: Duration::from_millis(env_or(
                "SWING_DETECTOR_TIMEOUT_MS",
                defaults.detector_timeout.as_millis() as u64,
            )),
            include_legacy: env_flag("SWING_INCLUDE_LEGACY", defaults.include_legacy),
            canonical_height: env_or("SWING_CANONICAL_HEIGHT", defaults.canonical_height),
            metrics_enabled: env_flag("METRICS_ENABLED", defaults.metrics_enabled),
            metrics_dump_path: std::env::var("METRICS_DUMP_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            json_logs: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
        }
    }

    /// Analysis tuning derived from this config.
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig::default()
            .with_detector_timeout(self.detector_timeout)
            .with_canonical_height(self.canonical_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.job_timeout, Duration::from_secs(120));
        assert_eq!(config.detector_timeout, Duration::from_millis(500));
        assert!(config.include_legacy);
        assert!(!config.metrics_enabled);
        assert!(config.metrics_dump_path.is_none());
    }

    #[test]
    fn test_analysis_config_carries_overrides() {
        let config = WorkerConfig {
            detector_timeout: Duration::from_millis(250),
            canonical_height: 1.8,
            ..WorkerConfig::default()
        };
        let analysis = config.analysis_config();
        assert_eq!(analysis.detector_timeout, Duration::from_millis(250));
        assert_eq!(analysis.canonical_height, 1.8);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        assert_eq!(env_or("SWING_TEST_UNSET_VARIABLE", 7u64), 7);
        assert!(env_flag("SWING_TEST_UNSET_FLAG", true));
    }
}
