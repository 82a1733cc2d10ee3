//! Configuration management for TinyClock.
//!
//! Everything is optional: a missing file means defaults, and every table
//! and field inside the file falls back to its default when omitted.

use std::path::{Path, PathBuf};

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::cli::LogLevel;
use crate::error::ConfigError;
use crate::i18n::Language;
use crate::render::{Canvas, LayoutOptions, LayoutPolicy};

pub mod paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was loaded from (empty when running on defaults)
    #[serde(skip)]
    pub path: PathBuf,

    #[serde(default)]
    pub icon: IconConfig,

    #[serde(default)]
    pub font: FontConfig,

    #[serde(default)]
    pub app: AppConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// tried and defaults are used when nothing is there.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let default_path = paths::config_file();
                if default_path.is_file() {
                    Self::load_from(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let mut config: Config = toml::from_str(&content)?;
        config.path = path.to_path_buf();
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let icon = &self.icon;
        if icon.width == 0 || icon.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "icon size must be non-zero, got {}x{}",
                icon.width, icon.height
            )));
        }
        if !(icon.shrink_step > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "shrink_step must be positive, got {}",
                icon.shrink_step
            )));
        }
        if !(icon.min_font_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_font_size must be positive, got {}",
                icon.min_font_size
            )));
        }
        if let Some(margin) = icon.margin {
            if margin >= icon.width || margin >= icon.height {
                return Err(ConfigError::Invalid(format!(
                    "margin {} leaves no room on a {}x{} icon",
                    margin, icon.width, icon.height
                )));
            }
        }
        Ok(())
    }

    pub fn canvas(&self) -> Result<Canvas, ConfigError> {
        Canvas::new(self.icon.width, self.icon.height)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn layout_options(&self) -> Result<LayoutOptions, ConfigError> {
        let canvas = self.canvas()?;
        let mut options = LayoutOptions::for_canvas(canvas, self.icon.layout);
        if let Some(margin) = self.icon.margin {
            options.margin = margin;
        }
        options.shrink_step = self.icon.shrink_step;
        options.min_font_size = self.icon.min_font_size;
        options.color = Rgba(self.icon.color);
        Ok(options)
    }

    /// Configured language, or the system language.
    pub fn language(&self) -> Language {
        self.app.language.unwrap_or_else(Language::detect)
    }
}

/// Icon canvas and layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconConfig {
    #[serde(default = "default_icon_side")]
    pub width: u32,

    #[serde(default = "default_icon_side")]
    pub height: u32,

    #[serde(default)]
    pub layout: LayoutPolicy,

    /// Pixels kept free of ink; defaults to a twelfth of the width
    pub margin: Option<u32>,

    #[serde(default = "default_shrink_step")]
    pub shrink_step: f32,

    #[serde(default = "default_min_font_size")]
    pub min_font_size: f32,

    /// RGBA glyph color
    #[serde(default = "default_color")]
    pub color: [u8; 4],
}

fn default_icon_side() -> u32 {
    32
}

fn default_shrink_step() -> f32 {
    1.0
}

fn default_min_font_size() -> f32 {
    6.0
}

fn default_color() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            width: default_icon_side(),
            height: default_icon_side(),
            layout: LayoutPolicy::default(),
            margin: None,
            shrink_step: default_shrink_step(),
            min_font_size: default_min_font_size(),
            color: default_color(),
        }
    }
}

/// Font fallback chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    /// File names (searched in the font directories) or absolute paths,
    /// tried in order
    #[serde(default = "default_font_candidates")]
    pub candidates: Vec<String>,

    /// Extra directories searched before the system font directories
    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,
}

fn default_font_candidates() -> Vec<String> {
    [
        "arial.ttf",
        "segoeui.ttf",
        "DejaVuSans.ttf",
        "LiberationSans-Regular.ttf",
        "NotoSans-Regular.ttf",
        "Helvetica.ttc",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            candidates: default_font_candidates(),
            search_dirs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Menu language; detected from the system locale when unset
    pub language: Option<Language>,

    /// Used when neither `--log-level` nor `RUST_LOG` is given
    pub log_level: Option<LogLevel>,
}
