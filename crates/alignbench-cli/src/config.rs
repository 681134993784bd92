//! Configuration vault – reads/writes `~/.alignbench/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted user configuration stored in `~/.alignbench/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to a JSON file of decoded frame records. Empty means "assemble
    /// the built-in demo bench".
    #[serde(default)]
    pub frames_path: String,

    /// Path the `/save` and `/load` commands use for the setup file.
    #[serde(default = "default_setup_path")]
    pub setup_path: String,

    /// Absolute tolerance for sync checks (mm / degrees).
    #[serde(default = "default_atol")]
    pub atol: f64,

    /// Relative tolerance for sync checks.
    #[serde(default = "default_rtol")]
    pub rtol: f64,

    /// Display rounding for reported vectors (decimal places).
    #[serde(default = "default_rounding")]
    pub rounding: usize,

    /// Frame pair the stage sync check compares: user frame …
    #[serde(default = "default_sync_from")]
    pub sync_from: String,

    /// … and object frame.
    #[serde(default = "default_sync_to")]
    pub sync_to: String,
}

fn default_setup_path() -> String {
    "alignbench_setup.json".to_string()
}
fn default_atol() -> f64 {
    1e-4
}
fn default_rtol() -> f64 {
    1e-4
}
fn default_rounding() -> usize {
    4
}
fn default_sync_from() -> String {
    "hexusr".to_string()
}
fn default_sync_to() -> String {
    "hexobj".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frames_path: String::new(),
            setup_path: default_setup_path(),
            atol: default_atol(),
            rtol: default_rtol(),
            rounding: default_rounding(),
            sync_from: default_sync_from(),
            sync_to: default_sync_to(),
        }
    }
}

/// Return the path to `~/.alignbench/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".alignbench").join("config.toml")
}

/// Load the config from disk. Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `ALIGNBENCH_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `ALIGNBENCH_FRAMES` | `frames_path` |
/// | `ALIGNBENCH_SETUP` | `setup_path` |
/// | `ALIGNBENCH_ATOL` | `atol` |
/// | `ALIGNBENCH_RTOL` | `rtol` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("ALIGNBENCH_FRAMES") {
        cfg.frames_path = v;
    }
    if let Ok(v) = std::env::var("ALIGNBENCH_SETUP") {
        cfg.setup_path = v;
    }
    if let Ok(v) = std::env::var("ALIGNBENCH_ATOL")
        && let Ok(tol) = v.parse::<f64>()
    {
        cfg.atol = tol;
    }
    if let Ok(v) = std::env::var("ALIGNBENCH_RTOL")
        && let Ok(tol) = v.parse::<f64>()
    {
        cfg.rtol = tol;
    }
}

/// Save the config to disk, creating `~/.alignbench/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}
