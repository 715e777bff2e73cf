//! Persistent application configuration.
//!
//! Stored as JSON in a platform-appropriate config directory. It is read at
//! startup and only written when the user presses Save in the settings window.

use std::fs;
use std::path::PathBuf;
use std::sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::scan::ScanTiming;

/// On-disk configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Position in the capture device list. With 0, a device named like a
    /// rear/back camera is picked first if there is one.
    pub camera_index: u32,

    /// Resolution asked of the camera; the closest supported format is used.
    pub ideal_width: u32,
    pub ideal_height: u32,

    /// Whether auto-scan is on when the app starts.
    pub auto_scan: bool,

    /// Pause after each auto-scan cycle.
    pub scan_delay_ms: u64,

    /// Minimum gap between two cycle starts, manual or automatic.
    pub debounce_ms: u64,

    /// JPEG quality (1-100) for stills sent to the service.
    pub jpeg_quality: u8,

    /// Analysis service model name.
    pub model: String,

    pub ui_zoom_factor: f32,

    /// Forced UI locale (e.g. "en-US"). `None` follows the desktop.
    pub locale: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_index: 0,
            ideal_width: 1920,
            ideal_height: 1080,
            auto_scan: true,
            scan_delay_ms: 1800,
            debounce_ms: 1000,
            jpeg_quality: imaging::DEFAULT_JPEG_QUALITY,
            model: vision::DEFAULT_MODEL.to_string(),
            ui_zoom_factor: 1.0,
            locale: None,
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("arlens.json"))
    }

    /// Load configuration from disk, falling back to defaults on any failure.
    pub fn load_or_default() -> Self {
        match Self::try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                Self::default()
            }
        }
    }

    /// Try to load configuration from disk.
    pub fn try_load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(&path).with_context(|| format!("read {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("parse {:?}", path))
    }

    fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(&path, json).with_context(|| format!("write {:?}", path))?;
        tracing::info!(?path, "config saved");
        Ok(())
    }

    pub fn scan_timing(&self) -> ScanTiming {
        ScanTiming {
            delay: Duration::from_millis(self.scan_delay_ms),
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }
}

static CONFIG: LazyLock<RwLock<Config>> = LazyLock::new(|| RwLock::new(Config::load_or_default()));

/// Mutable access to the process-wide config.
///
/// Note: this will deadlock if a guard is already held on the same thread.
pub fn config() -> RwLockWriteGuard<'static, Config> {
    CONFIG.write().unwrap_or_else(PoisonError::into_inner)
}

pub fn config_read() -> RwLockReadGuard<'static, Config> {
    CONFIG.read().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scan_contract() {
        let cfg = Config::default();
        assert_eq!(cfg.scan_timing(), ScanTiming::default());
        assert_eq!((cfg.ideal_width, cfg.ideal_height), (1920, 1080));
        assert_eq!(cfg.jpeg_quality, 50);
        assert!(cfg.auto_scan);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = Config::from_json(r#"{"camera_index": 2, "scan_delay_ms": 2500}"#).unwrap();
        assert_eq!(cfg.camera_index, 2);
        assert_eq!(cfg.scan_delay_ms, 2500);
        assert_eq!(cfg.debounce_ms, 1000);
        assert_eq!(cfg.model, vision::DEFAULT_MODEL);
    }

    #[test]
    fn roundtrips_through_json() {
        let cfg = Config {
            locale: Some("en-US".into()),
            ..Config::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), cfg);
    }
}
