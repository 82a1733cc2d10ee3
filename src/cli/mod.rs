//! CLI command definitions and handlers.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::render::LayoutPolicy;

pub mod config;
pub mod render;
pub mod startup;

/// TinyClock - the current time as a system tray icon.
///
/// Run without a command to start the tray icon.
#[derive(Parser, Debug)]
#[command(name = "tinyclock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level [default: config file `[app] log_level`, then info]
    #[arg(long, env = "TINYCLOCK_LOG_LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Path to config file
    #[arg(long, env = "TINYCLOCK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The command to run; no command means the tray.
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Tray)
    }

    /// The command line wins over the config file.
    pub fn effective_log_level(&self, configured: Option<LogLevel>) -> LogLevel {
        self.log_level.or(configured).unwrap_or(LogLevel::Info)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the clock in the system tray (default)
    Tray,

    /// Render one clock icon to a PNG file
    Render {
        /// Output file
        #[arg(long, short)]
        out: PathBuf,

        /// Time to render as HH:MM (24-hour); defaults to now
        #[arg(long, value_parser = render::parse_time)]
        time: Option<chrono::NaiveTime>,

        /// Layout override
        #[arg(long, value_enum)]
        layout: Option<LayoutPolicy>,

        /// Canvas size override as WIDTHxHEIGHT
        #[arg(long, value_parser = render::parse_size)]
        size: Option<(u32, u32)>,
    },

    /// Manage launch at login
    Startup {
        #[command(subcommand)]
        action: StartupAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum StartupAction {
    /// Show whether TinyClock starts at login
    Status,
    /// Start TinyClock at login
    Enable,
    /// Stop starting TinyClock at login
    Disable,
    /// Flip the current setting
    Toggle,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Validate configuration file
    Validate,

    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_runs_tray() {
        let cli = Cli::try_parse_from(["tinyclock"]).unwrap();
        assert!(matches!(cli.command(), Command::Tray));
        assert_eq!(cli.effective_log_level(None), LogLevel::Info);
    }

    #[test]
    fn test_render_arguments() {
        let cli = Cli::try_parse_from([
            "tinyclock",
            "render",
            "--out",
            "clock.png",
            "--time",
            "13:05",
            "--layout",
            "stacked",
            "--size",
            "24x24",
        ])
        .unwrap();

        match cli.command() {
            Command::Render {
                out,
                time,
                layout,
                size,
            } => {
                assert_eq!(out, &PathBuf::from("clock.png"));
                assert_eq!(*time, chrono::NaiveTime::from_hms_opt(13, 5, 0));
                assert_eq!(*layout, Some(LayoutPolicy::Stacked));
                assert_eq!(*size, Some((24, 24)));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["tinyclock", "startup", "status", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert!(matches!(
            cli.command(),
            Command::Startup {
                action: StartupAction::Status
            }
        ));
    }

    #[test]
    fn test_configured_log_level_used_without_flag() {
        let cli = Cli::try_parse_from(["tinyclock", "version"]).unwrap();
        assert_eq!(cli.effective_log_level(Some(LogLevel::Trace)), LogLevel::Trace);

        let cli = Cli::try_parse_from(["tinyclock", "--log-level", "warn", "version"]).unwrap();
        assert_eq!(cli.effective_log_level(Some(LogLevel::Trace)), LogLevel::Warn);
    }

    #[test]
    fn test_bad_size_rejected() {
        assert!(Cli::try_parse_from(["tinyclock", "render", "--out", "a.png", "--size", "24"]).is_err());
    }
}
