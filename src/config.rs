use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    camera::CameraParams,
    composition::{DEFAULT_TIMER_SECONDS, MAX_TIMER_SECONDS},
    error::{ConfigError, Result},
    filters::BUILTIN_FILTERS,
};

/// Main configuration for the photo booth
///
/// Every section may be left out of the TOML file; missing values take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial control settings
    pub booth: BoothConfig,

    /// Template and output folders
    pub paths: PathsConfig,

    /// Display surface settings
    pub display: DisplayConfig,

    /// Camera source
    pub camera: CameraParams,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.booth.validate()?;
        self.display.validate()?;

        if !(0.0..=1.0).contains(&self.camera.failure_rate) {
            return Err(ConfigError::InvalidValue {
                key: "camera.failure_rate".to_string(),
                value: self.camera.failure_rate.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Initial values of the operator controls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    /// Countdown before each shot, 0-10 seconds
    pub timer_seconds: u32,

    /// Filter name (none, grayscale, blur, sepia)
    pub filter: String,

    /// Template file name selected at startup
    pub template: Option<String>,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            timer_seconds: DEFAULT_TIMER_SECONDS,
            filter: "none".to_string(),
            template: None,
        }
    }
}

impl BoothConfig {
    fn validate(&self) -> Result<()> {
        if self.timer_seconds > MAX_TIMER_SECONDS {
            return Err(ConfigError::InvalidValue {
                key: "booth.timer_seconds".to_string(),
                value: self.timer_seconds.to_string(),
            }
            .into());
        }

        if !BUILTIN_FILTERS.contains(&self.filter.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "booth.filter".to_string(),
                value: self.filter.clone(),
            }
            .into());
        }

        Ok(())
    }
}

/// Where templates come from and collages go
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("images"),
        }
    }
}

/// Display surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Size every displayed image is scaled to
    pub width: u32,
    pub height: u32,

    /// Live preview refresh period in milliseconds
    pub preview_interval_ms: u64,

    /// How long a finished collage stays on screen before the preview resumes
    pub collage_hold_ms: u64,

    /// File the latest displayed image is written to, if any
    pub snapshot: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            preview_interval_ms: 10,
            collage_hold_ms: 5000,
            snapshot: None,
        }
    }
}

impl DisplayConfig {
    pub fn preview_interval(&self) -> Duration {
        Duration::from_millis(self.preview_interval_ms)
    }

    pub fn collage_hold(&self) -> Duration {
        Duration::from_millis(self.collage_hold_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "display.size".to_string(),
                value: format!("{}x{}", self.width, self.height),
            }
            .into());
        }

        if self.preview_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "display.preview_interval_ms".to_string(),
                value: self.preview_interval_ms.to_string(),
            }
            .into());
        }

        Ok(())
    }
}
