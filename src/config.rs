//! Client configuration, loaded from `config.toml` in the user config dir.
//!
//! Every field has a default so a missing file or a partial file is fine.
//! `WATTCOMPARE_BASE_URL` overrides `base_url` after the file is read.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

use crate::error::{Result, WattCompareError};

pub const BASE_URL_ENV: &str = "WATTCOMPARE_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Origin of the backend serving both the API and the frontend.
    pub base_url: String,
    /// JPEG quality for camera captures (1-100).
    pub jpeg_quality: u8,
    /// Raster size used when the camera does not report its resolution.
    pub default_capture_width: u32,
    pub default_capture_height: u32,
    /// Where exported reports land. `None` means the platform download dir.
    pub download_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            jpeg_quality: 90,
            default_capture_width: 640,
            default_capture_height: 480,
            download_dir: None,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                info!("Using base URL from {}: {}", BASE_URL_ENV, url);
                config.base_url = url.trim().to_string();
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| WattCompareError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded config from {:?}", path);
        config.validate()?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("wattcompare").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map_err(|e| WattCompareError::Config(format!("invalid base_url '{}': {}", self.base_url, e)))?;
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(WattCompareError::Config(format!(
                "jpeg_quality must be 1-100, got {}",
                self.jpeg_quality
            )));
        }
        if self.default_capture_width == 0 || self.default_capture_height == 0 {
            return Err(WattCompareError::Config(
                "default capture size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory for delivered reports.
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
