//! Generation Config - Invocation Parameters
//!
//! The same structure is written as `config.json` at the start of every run,
//! so a snapshot can be fed back in with `--config`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_FONT_SIZE: u32 = 16;
pub const DEFAULT_IMAGE_SIZE: ImageSize = ImageSize { width: 30, height: 30 };
pub const DEFAULT_EXTENSION: &str = "jpg";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid image size format: {0}. Use WxH (e.g., 128x128)")]
    InvalidImageSize(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Failed to read config {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Malformed config: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Canvas dimensions in pixels, written as `WxH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidImageSize(format!("{}x{}", width, height)));
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        let parts: Vec<&str> = lower.split('x').collect();
        if parts.len() != 2 {
            return Err(ConfigError::InvalidImageSize(s.to_string()));
        }
        let width = parts[0].trim().parse::<u32>()
            .map_err(|_| ConfigError::InvalidImageSize(s.to_string()))?;
        let height = parts[1].trim().parse::<u32>()
            .map_err(|_| ConfigError::InvalidImageSize(s.to_string()))?;
        Self::new(width, height).map_err(|_| ConfigError::InvalidImageSize(s.to_string()))
    }
}

impl TryFrom<String> for ImageSize {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ImageSize> for String {
    fn from(size: ImageSize) -> Self {
        size.to_string()
    }
}

/// Parameters of one training source run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub text_file_paths: Vec<PathBuf>,
    pub font_paths: Vec<PathBuf>,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_image_size")]
    pub image_size: ImageSize,
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_font_size() -> u32 { DEFAULT_FONT_SIZE }
fn default_image_size() -> ImageSize { DEFAULT_IMAGE_SIZE }
fn default_extension() -> String { DEFAULT_EXTENSION.to_string() }

impl GenerationConfig {
    pub fn new(text_file_paths: Vec<PathBuf>, font_paths: Vec<PathBuf>) -> Self {
        Self {
            text_file_paths,
            font_paths,
            font_size: DEFAULT_FONT_SIZE,
            image_size: DEFAULT_IMAGE_SIZE,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Load a config previously written as `config.json`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.text_file_paths.is_empty() {
            return Err(ConfigError::Invalid("no character list files given".into()));
        }
        if self.font_paths.is_empty() {
            return Err(ConfigError::Invalid("no font files given".into()));
        }
        if self.font_size == 0 {
            return Err(ConfigError::Invalid("font size must be positive".into()));
        }
        if self.image_size.width == 0 || self.image_size.height == 0 {
            return Err(ConfigError::Invalid(format!("image size {} has no area", self.image_size)));
        }
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Invalid("extension must not be empty".into()));
        }
        Ok(())
    }

    /// Extension without a leading dot.
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_parse() {
        assert_eq!("128x64".parse::<ImageSize>().unwrap(), ImageSize { width: 128, height: 64 });
        assert_eq!("30X30".parse::<ImageSize>().unwrap(), ImageSize { width: 30, height: 30 });
        assert!("30".parse::<ImageSize>().is_err());
        assert!("30x30x3".parse::<ImageSize>().is_err());
        assert!("0x30".parse::<ImageSize>().is_err());
        assert!("ax30".parse::<ImageSize>().is_err());
    }

    #[test]
    fn test_config_snapshot_format() {
        let mut config = GenerationConfig::new(
            vec![PathBuf::from("doc/level1.txt")],
            vec![PathBuf::from("fonts/Noto.ttf")],
        );
        config.image_size = ImageSize::new(30, 20).unwrap();

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["image_size"], "30x20");
        assert_eq!(value["font_size"], 16);
        assert_eq!(value["extension"], "jpg");
        assert_eq!(value["text_file_paths"][0], "doc/level1.txt");
    }

    #[test]
    fn test_config_defaults_on_load() {
        let json = r#"{"text_file_paths": ["a.txt"], "font_paths": ["b.ttf"]}"#;
        let config: GenerationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(config.image_size, DEFAULT_IMAGE_SIZE);
        assert_eq!(config.extension, "jpg");
    }

    #[test]
    fn test_validate_rejects_zero_area_image_size() {
        let mut config = GenerationConfig::new(vec![PathBuf::from("a.txt")], vec![PathBuf::from("b.ttf")]);
        config.image_size = ImageSize { width: 0, height: 30 };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("0x30"));
    }

    #[test]
    fn test_validate_rejects_empty_inputs() {
        let config = GenerationConfig::new(vec![], vec![PathBuf::from("b.ttf")]);
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::new(vec![PathBuf::from("a.txt")], vec![PathBuf::from("b.ttf")]);
        config.extension = ".".into();
        assert!(config.validate().is_err());

        config.extension = ".png".into();
        assert!(config.validate().is_ok());
        assert_eq!(config.extension(), "png");
    }
}
