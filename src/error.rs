//! Error types for TinyClock.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Font file could not be read: {path}: {source}")]
    FontRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Font file is not a usable TrueType/OpenType font: {0}")]
    FontParse(String),

    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Auto-start location not available: {0}")]
    Unavailable(String),

    #[error("Could not resolve the current executable: {0}")]
    CurrentExe(#[source] std::io::Error),

    #[error("Auto-start I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file could not be read: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
