use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Longest execution deadline a config will accept, in seconds
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Configuration for the execution sandbox
///
/// # Examples
///
/// ```rust
/// use polybrain::Config;
///
/// let config = Config::builder()
///     .python_bin("python3")
///     .timeout_secs(120)
///     .echo_output(false)
///     .build()
///     .expect("valid configuration");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Python interpreter used to replay session history
    #[serde(default = "default_python_bin")]
    pub python_bin: String,

    /// Hard deadline for a single replay, in seconds. `None` leaves the
    /// execution unbounded; expiry kills the interpreter and poisons the
    /// session.
    pub timeout_secs: Option<u64>,

    /// Forward captured output to this process's own stdout/stderr while it
    /// is being recorded
    #[serde(default = "default_true")]
    pub echo_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            python_bin: default_python_bin(),
            timeout_secs: None,
            echo_output: true,
        }
    }
}

impl Config {
    /// Create a new config builder for fluent configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Build a config from environment variables, falling back to defaults.
    ///
    /// Recognized variables: `POLYBRAIN_PYTHON`, `POLYBRAIN_TIMEOUT_SECS`,
    /// `POLYBRAIN_QUIET` (any value disables live echo).
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Ok(python_bin) = std::env::var("POLYBRAIN_PYTHON") {
            builder = builder.python_bin(python_bin);
        }
        if let Ok(raw) = std::env::var("POLYBRAIN_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| {
                Error::configuration(format!(
                    "POLYBRAIN_TIMEOUT_SECS must be an integer, got '{raw}'"
                ))
            })?;
            builder = builder.timeout_secs(secs);
        }
        if std::env::var("POLYBRAIN_QUIET").is_ok() {
            builder = builder.echo_output(false);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.python_bin.trim().is_empty() {
            return Err(Error::configuration("python_bin must not be empty"));
        }

        if let Some(secs) = self.timeout_secs {
            if secs == 0 || secs > MAX_TIMEOUT_SECS {
                return Err(Error::configuration(format!(
                    "timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {secs}"
                )));
            }
        }

        Ok(())
    }
}

/// Builder for creating `Config` instances with fluent configuration
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the Python interpreter to use
    pub fn python_bin(mut self, python_bin: impl Into<String>) -> Self {
        self.config.python_bin = python_bin.into();
        self
    }

    /// Set the execution deadline in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = Some(timeout_secs);
        self
    }

    /// Enable or disable live forwarding of captured output
    pub fn echo_output(mut self, echo_output: bool) -> Self {
        self.config.echo_output = echo_output;
        self
    }

    /// Build the final configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn default_python_bin() -> String {
    "python3".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.python_bin, "python3");
        assert_eq!(config.timeout_secs, None);
        assert!(config.echo_output);
    }

    #[test]
    fn test_builder_round_trip() {
        let config = Config::builder()
            .python_bin("python3.12")
            .timeout_secs(90)
            .echo_output(false)
            .build()
            .unwrap();

        assert_eq!(config.python_bin, "python3.12");
        assert_eq!(config.timeout_secs, Some(90));
        assert!(!config.echo_output);
    }

    #[test]
    fn test_empty_python_bin_rejected() {
        let err = Config::builder().python_bin("  ").build().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_timeout_bounds_enforced() {
        assert!(Config::builder().timeout_secs(0).build().is_err());
        assert!(Config::builder()
            .timeout_secs(MAX_TIMEOUT_SECS + 1)
            .build()
            .is_err());
        assert!(Config::builder()
            .timeout_secs(MAX_TIMEOUT_SECS)
            .build()
            .is_ok());
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.python_bin, "python3");
        assert!(config.echo_output);
    }
}
