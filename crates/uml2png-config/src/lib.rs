//! Configuration management for uml2png.
//!
//! Parses `uml2png.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `server.url` supports `${VAR}` references, which expand to the value of
//! `VAR` and error if it is unset.
//!
//! ## Example
//!
//! ```toml
//! [server]
//! url = "https://plantuml.example.com/plantuml"
//! timeout_secs = 10
//!
//! [input]
//! pattern = "*.puml"
//!
//! [output]
//! dir_name = "sortie_png"
//! ```

mod expand;

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "uml2png.toml";

/// Public `PlantUML` rendering service.
pub const DEFAULT_SERVER_URL: &str = "https://www.plantuml.com/plantuml";

/// Name of the output subdirectory created inside the input directory.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "sortie_png";

/// Glob matched against file names in the input directory.
pub const DEFAULT_PATTERN: &str = "*.puml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override `PlantUML` server URL.
    pub server_url: Option<String>,
    /// Override HTTP timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Override source file pattern.
    pub pattern: Option<String>,
    /// Override output subdirectory name.
    pub output_dir_name: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering server configuration.
    pub server: ServerConfig,
    /// Source discovery configuration.
    pub input: InputConfig,
    /// Output configuration.
    pub output: OutputConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rendering server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the `PlantUML` server (without the `/png/` suffix).
    pub url: String,
    /// HTTP timeout for a single request, in seconds.
    pub timeout_secs: u64,
}

impl ServerConfig {
    /// HTTP timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_owned(),
            timeout_secs: 30,
        }
    }
}

/// Source discovery configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Glob matched against file names (not paths) in the input directory.
    pub pattern: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_owned(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Subdirectory of the input directory that receives PNG files.
    pub dir_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir_name: DEFAULT_OUTPUT_DIR_NAME.to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.url`").
        field: String,
        /// Error message (e.g., "${`PLANTUML_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `uml2png.toml` in current directory and parents,
    /// falling back to built-in defaults.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. The merged result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_config(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(server_url) = &settings.server_url {
            self.server.url.clone_from(server_url);
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.server.timeout_secs = timeout_secs;
        }
        if let Some(pattern) = &settings.pattern {
            self.input.pattern.clone_from(pattern);
        }
        if let Some(dir_name) = &settings.output_dir_name {
            self.output.dir_name.clone_from(dir_name);
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`] after CLI settings are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_input()?;
        self.validate_output()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.url, "server.url")?;
        require_http_url(&self.server.url, "server.url")?;
        if self.server.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "server.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_input(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.input.pattern, "input.pattern")?;
        glob::Pattern::new(&self.input.pattern).map_err(|e| {
            ConfigError::Validation(format!("input.pattern is not a valid glob: {e}"))
        })?;
        Ok(())
    }

    fn validate_output(&self) -> Result<(), ConfigError> {
        let dir_name = &self.output.dir_name;
        require_non_empty(dir_name, "output.dir_name")?;

        // Must stay inside the input directory.
        let mut components = Path::new(dir_name).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_normal {
            return Err(ConfigError::Validation(format!(
                "output.dir_name must be a single directory name, got '{dir_name}'"
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.url = expand::expand_env(&self.server.url, "server.url")?;
        Ok(())
    }
}
