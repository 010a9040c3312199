//! Configuration file format.
//!
//! Every section is optional; missing keys fall back to their defaults.
//!
//! ```toml
//! [camera]
//! device_id = 0
//! width = 640
//! height = 640
//!
//! [scan]
//! box_width = 280
//! box_height = 140
//! interval_ms = 100
//! symbology = "ean_13"
//!
//! [display]
//! width = 320
//!
//! [output]
//! once = false
//! metrics_port = 0
//! ```

use crate::capture::{CameraConfig, ConfigError};
use crate::decode::Symbology;
use crate::geometry::ScanBox;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl FileConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate()?;
        self.scan.validate()?;
        if self.display.width == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        Ok(())
    }
}

/// Scan box, sampling cadence and target symbology.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Scan box width in display pixels.
    pub box_width: u32,
    /// Scan box height in display pixels.
    pub box_height: u32,
    /// Delay between sampler ticks.
    pub interval_ms: u64,
    pub symbology: Symbology,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            box_width: 280,
            box_height: 140,
            interval_ms: 100,
            symbology: Symbology::default(),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.box_width == 0 || self.box_height == 0 {
            return Err(ConfigError::InvalidScanBox {
                width: self.box_width,
                height: self.box_height,
            });
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    pub fn scan_box(&self) -> ScanBox {
        ScanBox::new(f64::from(self.box_width), f64::from(self.box_height))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// On-screen viewport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rendered width of the camera view in pixels.
    pub width: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { width: 320 }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Stop after the first confirmed value.
    pub once: bool,
    /// Stop after this many seconds.
    pub duration_secs: Option<u64>,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}
