//! Explicit owner of named [Containers](Container). There is no process-wide default container -
//! callers create containers through a [Runtime] and pass them wherever resolution happens.

use crate::config::RuntimeConfig;
use config::ConfigError;
use indexmap::IndexMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;
use wirebind_di::container::Container;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Error loading configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid log filter: {0}")]
    LogFilter(#[from] ParseError),
    #[error("Container named '{0}' already exists.")]
    DuplicateContainer(String),
}

/// Tracks containers by unique name and sets up logging according to [RuntimeConfig].
#[derive(Debug)]
pub struct Runtime {
    config: RuntimeConfig,
    containers: RwLock<IndexMap<String, Container>>,
}

impl Runtime {
    /// Creates a runtime with configuration loaded from the environment.
    pub fn new() -> Result<Self, RuntimeError> {
        Self::with_config(RuntimeConfig::init_from_environment()?)
    }

    pub fn with_config(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        if config.install_tracing_logger {
            install_tracing_logger(&config.log_filter)?;
        }

        Ok(Self {
            config,
            containers: Default::default(),
        })
    }

    #[inline]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Creates a new container with given name.
    pub fn container(&self, name: impl Into<String>) -> Result<Container, RuntimeError> {
        let name = name.into();
        let mut containers = self
            .containers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if containers.contains_key(&name) {
            return Err(RuntimeError::DuplicateContainer(name));
        }

        debug!("Creating container '{name}'.");

        let container = Container::new(name.clone());
        containers.insert(name, container.clone());
        Ok(container)
    }

    /// Returns a previously created container.
    pub fn get(&self, name: &str) -> Option<Container> {
        self.containers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// All containers in creation order.
    pub fn containers(&self) -> Vec<Container> {
        self.containers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

fn install_tracing_logger(log_filter: &str) -> Result<(), RuntimeError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_filter)?,
    };

    // another subscriber may already be set, e.g. by the application itself
    match tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        Ok(()) => info!("Installed tracing logger."),
        Err(error) => debug!("Not installing tracing logger: {error}"),
    }

    Ok(())
}
