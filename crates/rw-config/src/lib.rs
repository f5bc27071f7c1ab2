//! Configuration management for RW.
//!
//! Parses `rw.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Path-like configuration values support `~` and environment variable
//! expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `math.typst_binary`
//! - `math.font_paths`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use rw_math::SpanPolicy;
pub use rw_typst::ClassStyle;
use rw_typst::{DEFAULT_EM_SIZE, DEFAULT_RETAIN};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override math rendering enabled flag.
    pub math_enabled: Option<bool>,
    /// Override the Typst executable.
    pub typst_binary: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rw.toml";

/// Default Typst executable.
const DEFAULT_TYPST_BINARY: &str = "typst";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Math rendering configuration.
    pub math: MathConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Math extraction and rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MathConfig {
    /// Whether math segments are rendered. Extraction always runs.
    pub enabled: bool,
    /// Typst executable, looked up in `PATH` when not absolute.
    pub typst_binary: String,
    /// Extra font directories (relative to the config file).
    pub font_paths: Vec<PathBuf>,
    /// Number of compiled formulas retained between compiles.
    pub cache_size: usize,
    /// Points per em for sizing rendered formulas.
    pub em_size: f64,
    /// Class names used on rendered output.
    pub class_style: ClassStyle,
    /// Whether formulas may span inline markup.
    pub span_policy: SpanPolicy,
}

impl Default for MathConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            typst_binary: DEFAULT_TYPST_BINARY.to_owned(),
            font_paths: Vec::new(),
            cache_size: DEFAULT_RETAIN,
            em_size: DEFAULT_EM_SIZE,
            class_style: ClassStyle::default(),
            span_policy: SpanPolicy::default(),
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
        /// Config field path (e.g., "`math.typst_binary`").
        field: String,
        /// Error message (e.g., "${`TYPST_HOME`} environment variable not found").
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

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `rw.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(enabled) = settings.math_enabled {
            self.math.enabled = enabled;
        }
        if let Some(binary) = &settings.typst_binary {
            self.math.typst_binary.clone_from(binary);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        Self::discover_from(&std::env::current_dir().ok()?)
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
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

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_math()
    }

    /// Validate math configuration.
    fn validate_math(&self) -> Result<(), ConfigError> {
        const MAX_CACHE_SIZE: usize = 10_000;

        require_non_empty(&self.math.typst_binary, "math.typst_binary")?;

        let em_size = self.math.em_size;
        if !em_size.is_finite() || em_size <= 0.0 {
            return Err(ConfigError::Validation(
                "math.em_size must be a positive number".to_owned(),
            ));
        }

        if self.math.cache_size > MAX_CACHE_SIZE {
            return Err(ConfigError::Validation(format!(
                "math.cache_size cannot exceed {MAX_CACHE_SIZE}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.math.typst_binary = expand::expand_env(&self.math.typst_binary, "math.typst_binary")?;

        for path in &mut self.math.font_paths {
            let expanded = expand::expand_env(&path.to_string_lossy(), "math.font_paths")?;
            *path = PathBuf::from(expanded);
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    ///
    /// A `typst_binary` containing a path separator is resolved too; a bare
    /// name is left for `PATH` lookup.
    fn resolve_paths(&mut self, config_dir: &Path) {
        for path in &mut self.math.font_paths {
            *path = config_dir.join(&*path);
        }

        if self.math.typst_binary.contains(std::path::MAIN_SEPARATOR)
            && Path::new(&self.math.typst_binary).is_relative()
        {
            self.math.typst_binary = config_dir
                .join(&self.math.typst_binary)
                .to_string_lossy()
                .into_owned();
        }
    }
}
