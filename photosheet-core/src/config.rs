use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::constants::*;
use crate::sheet::SheetSettings;

/// Configuration for Photosheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub paper: PaperConfig,
    pub photo: PhotoConfig,
    pub layout: LayoutConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Paper width in millimeters
    pub width_mm: f64,
    /// Paper height in millimeters
    pub height_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoConfig {
    /// Photo width in millimeters
    pub width_mm: f64,
    /// Photo height in millimeters
    pub height_mm: f64,
    /// Draw a thin gray cutting border around each photo
    #[serde(default = "default_border")]
    pub border: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Print resolution in dots per inch
    pub dpi: u32,
    /// Distance from the paper edge in millimeters
    pub margin_mm: f64,
    /// Distance between photos in millimeters
    pub spacing_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory exported sheets are written to
    pub directory: PathBuf,
    /// File name prefix, followed by a sheet counter
    pub file_prefix: String,
}

fn default_border() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_prefix: "passport-sheet".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paper: PaperConfig {
                width_mm: A4_WIDTH_MM,
                height_mm: A4_HEIGHT_MM,
            },
            photo: PhotoConfig {
                width_mm: PASSPORT_WIDTH_MM,
                height_mm: PASSPORT_HEIGHT_MM,
                border: true,
            },
            layout: LayoutConfig {
                dpi: PRINT_DPI,
                margin_mm: SHEET_MARGIN_MM,
                spacing_mm: PHOTO_SPACING_MM,
            },
            output: OutputConfig::default(),
        }
    }
}

/// A configuration value that cannot produce a sheet
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite, non-negative number of millimeters (got {value})")]
    InvalidLength { field: &'static str, value: f64 },

    #[error("{field} must be greater than zero")]
    ZeroSize { field: &'static str },

    #[error("dpi must be greater than zero")]
    ZeroDpi,

    #[error("sheet of {width}x{height} pixels exceeds the {max} pixel limit, lower dpi or paper size")]
    TooLarge { width: u32, height: u32, max: u64 },
}

impl Config {
    /// Load configuration from file, or create default if not exists
    pub fn load(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            // Create default config
            info!("No config at {}, writing defaults", config_path.display());
            let config = Config::default();
            config.write_to(&config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<PathBuf>) -> anyhow::Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => default_config_path()?,
        };
        self.write_to(&config_path)
    }

    fn write_to(&self, config_path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(config_path, contents)?;
        Ok(())
    }

    /// Reject values the layout cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lengths = [
            ("paper.width_mm", self.paper.width_mm, true),
            ("paper.height_mm", self.paper.height_mm, true),
            ("photo.width_mm", self.photo.width_mm, true),
            ("photo.height_mm", self.photo.height_mm, true),
            ("layout.margin_mm", self.layout.margin_mm, false),
            ("layout.spacing_mm", self.layout.spacing_mm, false),
        ];

        for (field, value, must_be_positive) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidLength { field, value });
            }
            if must_be_positive && value == 0.0 {
                return Err(ConfigError::ZeroSize { field });
            }
        }

        if self.layout.dpi == 0 {
            return Err(ConfigError::ZeroDpi);
        }

        let page = self.sheet_settings().placement_config().page_size;
        if page.width as u64 * page.height as u64 > MAX_SHEET_PIXELS {
            return Err(ConfigError::TooLarge {
                width: page.width,
                height: page.height,
                max: MAX_SHEET_PIXELS,
            });
        }

        Ok(())
    }

    /// The physical layout the sheet builder works from
    pub fn sheet_settings(&self) -> SheetSettings {
        SheetSettings {
            dpi: self.layout.dpi,
            paper_mm: (self.paper.width_mm, self.paper.height_mm),
            photo_mm: (self.photo.width_mm, self.photo.height_mm),
            margin_mm: self.layout.margin_mm,
            spacing_mm: self.layout.spacing_mm,
            border: self.photo.border,
        }
    }
}

fn default_config_path() -> anyhow::Result<PathBuf> {
    let mut p = dirs::config_dir().context("No config directory")?;
    p.push("photosheet");
    p.push("config.toml");
    Ok(p)
}

mod dirs {
    use std::path::PathBuf;

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            let mut path = PathBuf::from(home);
            path.push(".config");
            path
        })
    }
}
