//! User configuration for rayzip.
//!
//! Stored in `~/.rayzip/config.toml`. A missing file means defaults; any
//! field left out of the file keeps its default value.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::stego::scheduler::DEFAULT_SLICE_PIXELS;
use crate::stego::{OutputFormat, MAX_PAYLOAD_SIZE};

/// Minimum cover image width and height in pixels.
pub const DEFAULT_MIN_IMAGE_DIMENSION: u32 = 100;

/// Default JPEG quality for lossy output.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Default number of bytes shown by the hex viewer.
pub const DEFAULT_HEX_LIMIT: usize = 1000;

/// Errors that can occur when loading or saving the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found. Unable to determine home directory.")]
    NoConfigDir,

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

/// Engine and CLI settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Largest payload accepted for embedding or declared in a header.
    pub max_payload_size: u32,

    /// Smallest accepted cover image width and height.
    pub min_image_dimension: u32,

    /// Pixels processed per scheduler slice.
    pub slice_pixels: usize,

    /// Container for encoded images.
    pub output_format: OutputFormat,

    /// JPEG quality (1-100), only used for JPEG output.
    pub jpeg_quality: u8,

    /// Try bounded repairs when an extracted payload has no ZIP signature.
    pub auto_correct: bool,

    /// Bytes shown by the hex viewer.
    pub hex_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE,
            min_image_dimension: DEFAULT_MIN_IMAGE_DIMENSION,
            slice_pixels: DEFAULT_SLICE_PIXELS,
            output_format: OutputFormat::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            auto_correct: true,
            hex_limit: DEFAULT_HEX_LIMIT,
        }
    }
}

impl Config {
    /// Load the configuration from the default location.
    ///
    /// Without a home directory there is nowhere to look, so defaults apply.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(ConfigError::NoConfigDir) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Load the configuration from `path`, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_payload_size == 0 {
            return Err(ConfigError::Invalid(
                "max_payload_size must be at least 1".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        if self.slice_pixels == 0 {
            return Err(ConfigError::Invalid(
                "slice_pixels must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(get_config_dir()?.join("config.toml"))
    }
}

/// Get the rayzip config directory (`~/.rayzip`).
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".rayzip"))
        .ok_or(ConfigError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_payload_size, 52_428_800);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            output_format: OutputFormat::Jpeg,
            jpeg_quality: 75,
            auto_correct: false,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "slice_pixels = 64\noutput_format = \"jpeg\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.slice_pixels, 64);
        assert_eq!(config.output_format, OutputFormat::Jpeg);
        assert_eq!(config.jpeg_quality, DEFAULT_JPEG_QUALITY);
        assert!(config.auto_correct);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "jpeg_quality = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        fs::write(&path, "slice_pixels = \"many\"\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::TomlParseError(_))
        ));
    }
}
