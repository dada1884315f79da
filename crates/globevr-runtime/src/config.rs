//! Bridge configuration – reads/writes `~/.globevr/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use globevr_types::VrError;
use serde::{Deserialize, Serialize};

/// Console log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = VrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(VrError::Config(format!("unknown log format '{other}'"))),
        }
    }
}

/// Settings for an [`HmdBridge`][crate::bridge::HmdBridge].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Multiplier applied to the HMD's eye offsets when setting frustum
    /// offsets.
    #[serde(default = "default_ipd_scale")]
    pub ipd_scale: f64,

    /// Re-bootstrap the reconciler once device discovery completes.
    #[serde(default)]
    pub reset_on_discovery: bool,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_ipd_scale() -> f64 {
    1.0
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            ipd_scale: default_ipd_scale(),
            reset_on_discovery: false,
            log_format: LogFormat::default(),
        }
    }
}

impl BridgeConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, VrError> {
        let cfg: Self =
            toml::from_str(raw).map_err(|e| VrError::Config(format!("Failed to parse config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings that would make stereo rendering meaningless.
    pub fn validate(&self) -> Result<(), VrError> {
        if !self.ipd_scale.is_finite() || self.ipd_scale <= 0.0 {
            return Err(VrError::Config(format!(
                "ipd_scale must be a positive number, got {}",
                self.ipd_scale
            )));
        }
        Ok(())
    }
}

/// Return the path to `~/.globevr/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".globevr").join("config.toml")
}

/// Load the config from disk and apply environment overrides.  Returns
/// `None` if the file does not exist.
pub fn load() -> Result<Option<BridgeConfig>, VrError> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

/// Load the config from a specific path, without environment overrides.
pub fn load_from(path: &Path) -> Result<Option<BridgeConfig>, VrError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        VrError::Config(format!("Failed to read config at {}: {e}", path.display()))
    })?;
    BridgeConfig::from_toml_str(&raw).map(Some)
}

/// Apply `GLOBEVR_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `GLOBEVR_IPD_SCALE` | `ipd_scale` |
/// | `GLOBEVR_LOG_FORMAT` | `log_format` |
///
/// Unparseable or invalid values are ignored.
pub fn apply_env_overrides(cfg: &mut BridgeConfig) {
    if let Ok(v) = std::env::var("GLOBEVR_IPD_SCALE")
        && let Ok(scale) = v.parse::<f64>()
        && scale.is_finite()
        && scale > 0.0
    {
        cfg.ipd_scale = scale;
    }
    if let Ok(v) = std::env::var("GLOBEVR_LOG_FORMAT")
        && let Ok(format) = v.parse::<LogFormat>()
    {
        cfg.log_format = format;
    }
}

/// Save the config to disk, creating `~/.globevr/` if necessary.
pub fn save(cfg: &BridgeConfig) -> Result<(), VrError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub fn save_to(cfg: &BridgeConfig, path: &Path) -> Result<(), VrError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| VrError::Config(format!("Failed to create config directory: {e}")))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| VrError::Config(format!("Failed to serialize config: {e}")))?;
    fs::write(path, raw).map_err(|e| {
        VrError::Config(format!("Failed to write config at {}: {e}", path.display()))
    })
}
