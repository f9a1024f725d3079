//! Configuration for the netswp ping sweeper.

use serde::Deserialize;

use crate::error::{Result, SweepError};

/// Upper bound on probes in flight.
pub const MAX_CONCURRENCY: usize = 4096;

/// Top-level sweep configuration.
///
/// Loaded from the `[sweep]` section of `netswp.toml` or from
/// `NETSWP__SWEEP__*` environment variables. Command-line flags override both.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Path to the ping binary (default: "ping").
    #[serde(default = "default_ping_path")]
    pub ping_path: String,

    /// Path to the IPv6 ping binary, used where `ping` is IPv4 only (macOS).
    #[serde(default = "default_ping6_path")]
    pub ping6_path: String,

    /// Maximum number of probes in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Retry unbound when a probe bound to an interface produces nothing.
    #[serde(default)]
    pub fallback_unbound: bool,

    /// Summary format.
    #[serde(default)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Per-host lines followed by a summary block.
    #[default]
    Text,
    /// A single JSON summary object.
    Json,
}

fn default_ping_path() -> String {
    "ping".to_string()
}

fn default_ping6_path() -> String {
    "ping6".to_string()
}

fn default_concurrency() -> usize {
    64
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            ping_path: default_ping_path(),
            ping6_path: default_ping6_path(),
            concurrency: default_concurrency(),
            fallback_unbound: false,
            output: OutputFormat::default(),
        }
    }
}

impl SweepConfig {
    /// Layer an optional config file and `NETSWP__` environment variables.
    ///
    /// A missing file or missing `[sweep]` section yields the defaults; a
    /// present but malformed section is an error.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("NETSWP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded = match cfg.get::<SweepConfig>("sweep") {
            Ok(c) => c,
            Err(config::ConfigError::NotFound(_)) => SweepConfig::default(),
            Err(e) => return Err(e.into()),
        };
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(SweepError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.concurrency > MAX_CONCURRENCY {
            return Err(SweepError::Config(format!(
                "concurrency must be at most {MAX_CONCURRENCY}, got {}",
                self.concurrency
            )));
        }
        if self.ping_path.trim().is_empty() {
            return Err(SweepError::Config("ping_path must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SweepConfig::default();
        assert_eq!(config.ping_path, "ping");
        assert_eq!(config.ping6_path, "ping6");
        assert_eq!(config.concurrency, 64);
        assert!(!config.fallback_unbound);
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let config = SweepConfig::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(config.concurrency, 64);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("netswp.toml"),
            r#"
[sweep]
ping_path = "/usr/bin/ping"
concurrency = 16
fallback_unbound = true
output = "json"
"#,
        )
        .unwrap();

        let prefix = dir.path().join("netswp");
        let config = SweepConfig::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(config.ping_path, "/usr/bin/ping");
        assert_eq!(config.ping6_path, "ping6");
        assert_eq!(config.concurrency, 16);
        assert!(config.fallback_unbound);
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("netswp.toml"), "[sweep]\nconcurrency = 0\n").unwrap();

        let prefix = dir.path().join("netswp");
        let err = SweepConfig::load(prefix.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SweepError::Config(_)));
    }

    #[test]
    fn test_huge_concurrency_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("netswp.toml"), "[sweep]\nconcurrency = 100000\n").unwrap();

        let prefix = dir.path().join("netswp");
        let err = SweepConfig::load(prefix.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SweepError::Config(_)));
        assert_eq!(err.exit_code(), 6);

        let config = SweepConfig {
            concurrency: usize::MAX,
            ..SweepConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SweepConfig {
            concurrency: MAX_CONCURRENCY,
            ..SweepConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
