//! Configuration file resolution and TOML loading
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`<MODULE>_CONFIG`, e.g. `SOUND_PLAYER_CONFIG`)
//! 3. User config file (`~/.config/<module>/config.toml` on Linux)
//! 4. System config file (`/etc/<module>/config.toml`, Linux only)
//!
//! A missing config file is never fatal: built-in defaults are used and
//! the caller logs a warning. A file that exists but cannot be read or parsed is an
//! error.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Root of a module's TOML config file.
///
/// Every module shares the `[logging]` table; the `[playback]` table is
/// module specific and deserialized into `P`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(bound(deserialize = "P: DeserializeOwned + Default"))]
pub struct TomlConfig<P> {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Module playback section (optional)
    #[serde(default)]
    pub playback: P,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Locates a module's config file.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    module_name: String,
    env_var: String,
}

impl ConfigResolver {
    /// Create a resolver for `module_name` (e.g. "sound-player").
    pub fn new(module_name: &str) -> Self {
        let env_var = format!(
            "{}_CONFIG",
            module_name.to_ascii_uppercase().replace('-', "_")
        );
        Self {
            module_name: module_name.to_string(),
            env_var,
        }
    }

    /// Name of the environment variable consulted at priority 2.
    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    /// Resolve the config file path.
    ///
    /// Explicit paths (CLI, environment) are returned whether or not they
    /// exist; discovered paths are only returned when present on disk.
    pub fn resolve(&self, cli_path: Option<&Path>) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_path {
            return Some(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3 and 4: well-known locations
        self.search_paths().into_iter().find(|p| p.exists())
    }

    /// Well-known config file locations in priority order.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(&self.module_name).join("config.toml"));
        }

        if cfg!(target_os = "linux") {
            paths.push(
                PathBuf::from("/etc")
                    .join(&self.module_name)
                    .join("config.toml"),
            );
        }

        paths
    }
}

/// Where a loaded config came from.
///
/// `load_toml` runs before logging is set up, so it reports its outcome
/// here and the caller logs it with `log()` once a subscriber exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// No config file was resolved
    Defaults,
    /// A path was resolved but nothing exists there
    Missing(PathBuf),
    /// Parsed from this file
    File(PathBuf),
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            Self::Defaults => info!("No config file found, using built-in defaults"),
            Self::Missing(path) => warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            ),
            Self::File(path) => info!("Loaded configuration from {}", path.display()),
        }
    }
}

/// Load a TOML config file into `T`.
///
/// `None` or a missing file yields `T::default()`. Tables and keys absent
/// from the file take their defaults.
pub fn load_toml<T>(path: Option<&Path>) -> Result<(T, ConfigSource)>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        return Ok((T::default(), ConfigSource::Defaults));
    };

    if !path.exists() {
        return Ok((T::default(), ConfigSource::Missing(path.to_path_buf())));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config = toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    Ok((config, ConfigSource::File(path.to_path_buf())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_name_derived_from_module() {
        let resolver = ConfigResolver::new("sound-player");
        assert_eq!(resolver.env_var(), "SOUND_PLAYER_CONFIG");
    }

    #[test]
    fn test_cli_path_wins_even_if_missing() {
        let resolver = ConfigResolver::new("sound-player-unit");
        let cli = PathBuf::from("/nonexistent/cli.toml");
        assert_eq!(resolver.resolve(Some(&cli)), Some(cli));
    }

    #[test]
    fn test_search_paths_end_with_config_toml() {
        let resolver = ConfigResolver::new("sound-player");
        for path in resolver.search_paths() {
            assert!(path.ends_with("sound-player/config.toml"), "{:?}", path);
        }
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(LoggingConfig::default().level, "info");
        assert!(LoggingConfig::default().file.is_none());
    }

    #[test]
    fn test_load_none_gives_defaults() {
        let (config, source): (TomlConfig<()>, _) = load_toml(None).unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(source, ConfigSource::Defaults);
    }
}
