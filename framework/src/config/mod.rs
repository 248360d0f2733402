//! Container configuration
//!
//! - `.env` file loading with environment based precedence
//! - [`ContainerConfig`]: where the definitions live and what to do after loading them
//! - [`ConfigNode`]: the generic tree definitions are described in
//!
//! # Example
//!
//! ```rust,no_run
//! use rivet::{Container, ContainerConfig};
//!
//! rivet::config::load_dotenv(std::path::Path::new("."));
//! let container = Container::from_config(&ContainerConfig::from_env())?;
//! # Ok::<(), rivet::LoadError>(())
//! ```

pub mod env;
pub mod loader;
pub mod tree;

pub use env::{env, env_optional, load_dotenv, Environment};
pub use loader::load_definitions;
pub use tree::ConfigNode;

use std::path::{Path, PathBuf};

use crate::container::Container;
use crate::error::LoadError;

const DEFAULT_CONFIG_PATH: &str = "config/rivet.json";

/// Settings for building a container from a definitions file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Definitions file
    pub config_path: PathBuf,
    pub environment: Environment,
    /// Build every definition right after loading
    pub eager: bool,
    /// Check definitions and references before returning the container
    pub validate: bool,
}

impl ContainerConfig {
    /// Build config from environment variables
    pub fn from_env() -> Self {
        Self {
            config_path: env("RIVET_CONFIG", PathBuf::from(DEFAULT_CONFIG_PATH)),
            environment: Environment::detect(),
            eager: env("RIVET_EAGER", false),
            validate: env("RIVET_VALIDATE", true),
        }
    }

    pub fn builder() -> ContainerConfigBuilder {
        ContainerConfigBuilder::default()
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Builder for ContainerConfig, unset values fall back to the environment
#[derive(Default)]
pub struct ContainerConfigBuilder {
    config_path: Option<PathBuf>,
    environment: Option<Environment>,
    eager: Option<bool>,
    validate: Option<bool>,
}

impl ContainerConfigBuilder {
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn eager(mut self, eager: bool) -> Self {
        self.eager = Some(eager);
        self
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn build(self) -> ContainerConfig {
        let default = ContainerConfig::from_env();
        ContainerConfig {
            config_path: self.config_path.unwrap_or(default.config_path),
            environment: self.environment.unwrap_or(default.environment),
            eager: self.eager.unwrap_or(default.eager),
            validate: self.validate.unwrap_or(default.validate),
        }
    }
}

impl Container {
    /// Create a container for all discovered component types and load the
    /// definitions file named by `config`
    pub fn from_config(config: &ContainerConfig) -> Result<Self, LoadError> {
        let container = Self::discover();
        let root = ConfigNode::from_path(&config.config_path)?;
        let registered = load_definitions(&container, &root)?;

        tracing::info!(
            path = %config.config_path.display(),
            environment = %config.environment,
            registered,
            "loaded component definitions"
        );

        if config.validate {
            container.validate()?;
        }
        if config.eager {
            let built = container.instantiate_all()?;
            tracing::info!(built, "instantiated components eagerly");
        }
        Ok(container)
    }
}
