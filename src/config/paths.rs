//! Path utilities for TinyClock.
//!
//! Defines standard locations for configuration and logs.

use std::path::PathBuf;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "TINYCLOCK_CONFIG";

/// Base data directory.
///
/// On Windows: `%APPDATA%\TinyClock\TinyClock\data`
/// On Linux: `~/.local/share/tinyclock`
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "TinyClock", "TinyClock")
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".tinyclock")
        })
}

/// Configuration file path.
pub fn config_file() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }

    data_dir().join("config.toml")
}

/// Log directory, created if missing.
pub fn log_dir() -> std::io::Result<PathBuf> {
    let path = data_dir().join("logs");
    std::fs::create_dir_all(&path)?;
    Ok(path)
}
