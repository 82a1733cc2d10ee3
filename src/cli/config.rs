//! Config command - configuration utilities.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::ConfigAction;
use crate::config::{self, Config};

/// Run the config command.
pub fn run(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    let config_path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(config::paths::config_file);

    match action {
        ConfigAction::Validate => validate_config(&config_path),
        ConfigAction::Show => show_config(&config_path),
        ConfigAction::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

fn validate_config(config_path: &Path) -> Result<()> {
    println!();
    println!("Validating configuration...");
    println!("Path: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!("No configuration file; built-in defaults are used.");
        println!();
        println!("Create a configuration file at:");
        println!("  {}", config_path.display());
        println!();
        return Ok(());
    }

    match Config::load(Some(config_path)) {
        Ok(config) => {
            println!("Configuration is valid.");
            println!();
            println!("Summary:");
            println!("  Icon: {}x{}", config.icon.width, config.icon.height);
            println!("  Layout: {:?}", config.icon.layout);
            println!("  Fonts: {}", config.font.candidates.join(", "));
            println!(
                "  Language: {}",
                config
                    .app
                    .language
                    .map(|l| format!("{:?}", l))
                    .unwrap_or_else(|| "(system)".to_string())
            );
        }
        Err(e) => {
            println!("ERROR: Configuration is invalid");
            println!();
            println!("Details: {}", e);
            println!();
            println!("Fix the configuration and run 'tinyclock config validate' again.");
            println!();
            return Err(e).context("Configuration is invalid");
        }
    }

    println!();
    Ok(())
}

fn show_config(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        println!("# No configuration file at {}; defaults:", config_path.display());
        println!("{}", toml::to_string_pretty(&Config::default())?);
        return Ok(());
    }

    let content = std::fs::read_to_string(config_path)?;
    println!("{}", content);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validate_accepts_good_config() {
        let file = config_file("[icon]\nwidth = 24\nheight = 24\n");
        assert!(run(ConfigAction::Validate, Some(file.path())).is_ok());
    }

    #[test]
    fn test_validate_fails_on_invalid_config() {
        let file = config_file("[icon]\nwidth = 0\n");
        let err = run(ConfigAction::Validate, Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("invalid"), "{:#}", err);
    }

    #[test]
    fn test_validate_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.toml");
        assert!(run(ConfigAction::Validate, Some(missing.as_path())).is_ok());
    }
}
