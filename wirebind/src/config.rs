//! Runtime configuration. [RuntimeConfig] is created with opinionated default values, which can then
//! be overwritten by environment variables prefixed with `WIREBIND_` or a `wirebind.json` file.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "WIREBIND";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "wirebind.json";

/// Default filter directives for the installed logger.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration of a [Runtime](crate::runtime::Runtime).
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuntimeConfig {
    /// Should a default tracing logger be installed when the runtime is created.
    pub install_tracing_logger: bool,
    /// Filter directives for the installed logger, used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl From<OptionalRuntimeConfig> for RuntimeConfig {
    fn from(value: OptionalRuntimeConfig) -> Self {
        let default = Self::default();
        Self {
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
            log_filter: value.log_filter.unwrap_or(default.log_filter),
        }
    }
}

impl RuntimeConfig {
    pub fn new(install_tracing_logger: bool, log_filter: impl Into<String>) -> Self {
        Self {
            install_tracing_logger,
            log_filter: log_filter.into(),
        }
    }

    /// Loads configuration from the default file and the environment.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Self::init_from_sources(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX)),
        )
    }

    fn init_from_sources(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            .build()
            .and_then(|config| config.try_deserialize::<OptionalRuntimeConfig>())
            .map(|config| config.into())
    }
}

#[derive(Deserialize)]
struct OptionalRuntimeConfig {
    install_tracing_logger: Option<bool>,
    log_filter: Option<String>,
}
