//! Application configuration management.
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. The user config file (`config.toml` in the platform config directory)
//! 3. `steep.toml` in the working directory
//! 4. `STEEP_*` environment variables (e.g. `STEEP_ENGINE=jinja`)
//! 5. Command-line flags ([`Config::apply_cli`])
//!
//! An explicit `--config <PATH>` replaces layers 2 and 3 and must exist.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::compiler::key::validate_extension;
use crate::compiler::{CollisionPolicy, CompileOptions};
use crate::engine::{EngineKind, UnknownEngine};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "steep.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "STEEP_";

/// Errors raised while loading or interpreting configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {}", .0.display())]
    Missing(PathBuf),

    /// A source could not be parsed into [`Config`].
    #[error("invalid configuration: {0}")]
    Extract(#[source] Box<figment::Error>),

    /// The configured engine is not registered.
    #[error(transparent)]
    Engine(#[from] UnknownEngine),

    /// The configured extension cannot match any file.
    #[error("invalid extension '{0}': must start with '.' and contain no path separator")]
    Extension(String),

    /// The configuration could not be serialized.
    #[error("cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine name (`html`, `jinja` or `mustache`).
    pub engine: String,
    /// Template root used when a command is given no directory.
    pub templates: PathBuf,
    /// Extension to compile; the engine's default when unset.
    pub extension: Option<String>,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Handling of duplicate keys.
    pub on_collision: CollisionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineKind::default().name().to_string(),
            templates: PathBuf::from("templates"),
            extension: None,
            recursive: true,
            on_collision: CollisionPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from every layer.
    ///
    /// With `explicit` set, that file replaces the user and local files.
    /// Values are not validated here: command-line flags applied later may
    /// still replace them, so call [`validate`](Self::validate) once the
    /// final values are in place.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::Missing(path.to_path_buf()));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(user) = Self::user_config_path() {
                    figment = figment.merge(Toml::file(user));
                }
                figment = figment.merge(Toml::file(LOCAL_CONFIG_FILE));
            }
        }

        let config = Self::extract(figment.merge(Env::prefixed(ENV_PREFIX)))?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Load and validate a single TOML file over the defaults, ignoring the
    /// environment.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let config = Self::extract(
            Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(path)),
        )?;
        config.validate()?;
        Ok(config)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(|e| ConfigError::Extract(Box::new(e)))
    }

    /// Platform-specific user config file.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "steep", "steep").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Check the engine name and extension.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine_kind()?;
        if let Some(extension) = &self.extension {
            validate_extension(extension).map_err(|_| ConfigError::Extension(extension.clone()))?;
        }
        Ok(())
    }

    /// Override settings with command-line flags.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(engine) = &cli.engine {
            self.engine.clone_from(engine);
        }
        if let Some(extension) = &cli.extension {
            self.extension = Some(extension.clone());
        }
        if cli.no_recursive {
            self.recursive = false;
        }
        if let Some(policy) = cli.on_collision {
            self.on_collision = policy;
        }
    }

    /// The configured engine.
    pub fn engine_kind(&self) -> Result<EngineKind, ConfigError> {
        Ok(EngineKind::from_name(&self.engine)?)
    }

    /// Compile options for the configured engine.
    pub fn compile_options(&self) -> Result<CompileOptions, ConfigError> {
        let extension = match &self.extension {
            Some(extension) => extension.clone(),
            None => self.engine_kind()?.default_extension().to_string(),
        };
        Ok(CompileOptions::new(extension, self.recursive).with_collision_policy(self.on_collision))
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
