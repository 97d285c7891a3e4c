//! Configuration loading and discovery for `pixeldrop.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::PixelDropConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file searched for.
pub const CONFIG_FILE_NAME: &str = "pixeldrop.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse pixeldrop.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CliOverrides {
    pub gravity: Option<f64>,
    pub spawn_rate: Option<u32>,
    pub hold_ms: Option<u64>,
    pub fill_fraction: Option<f64>,
    pub seed: Option<u64>,
    /// Override the collection store directory
    pub store: Option<PathBuf>,
}

/// Find pixeldrop.toml by walking up from the current working directory,
/// then in the XDG config directory.
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find pixeldrop.toml in XDG_CONFIG_HOME/pixeldrop (or ~/.config/pixeldrop).
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("pixeldrop").join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Find pixeldrop.toml by walking up from `start`.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one the file is discovered with
/// [`find_config`]; if none is found the built-in defaults are returned.
pub fn load_config(path: Option<&Path>) -> Result<PixelDropConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => {
            log::debug!("no {} found, using defaults", CONFIG_FILE_NAME);
            Ok(PixelDropConfig::default())
        }
    }
}

/// Load and validate one file. A relative `collection.dir` is resolved
/// against the file's directory.
fn load_config_file(path: &Path) -> Result<PixelDropConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: PixelDropConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let (Some(root), Some(dir)) = (config_root(path), config.collection.dir.as_ref()) {
        config.collection.dir = Some(resolve_path(root, dir));
    }
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. The result is
/// not re-validated here; callers should run [`PixelDropConfig::validate`].
pub fn merge_cli_overrides(config: &mut PixelDropConfig, overrides: &CliOverrides) {
    if let Some(gravity) = overrides.gravity {
        config.wall.gravity = gravity;
    }
    if let Some(spawn_rate) = overrides.spawn_rate {
        config.wall.spawn_rate = spawn_rate;
    }
    if let Some(hold_ms) = overrides.hold_ms {
        config.wall.hold_ms = hold_ms;
    }
    if let Some(fill_fraction) = overrides.fill_fraction {
        config.wall.fill_fraction = fill_fraction;
    }
    if let Some(seed) = overrides.seed {
        config.wall.seed = Some(seed);
    }
    if let Some(ref store) = overrides.store {
        config.collection.dir = Some(store.clone());
    }
}

/// Directory containing a config file.
pub fn config_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the config directory. Absolute paths are
/// returned unchanged.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
