//! TinyClock
//!
//! Shows the current time as a system tray icon, redrawn at the top of every
//! minute, with an optional launch-at-login toggle.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

mod cli;
mod config;
mod crash;
mod error;
mod i18n;
mod render;
mod scheduler;
mod startup;
mod tray;

use cli::{Cli, Command, LogLevel};
use config::Config;

fn main() {
    // Wrap everything to catch early errors
    if let Err(e) = real_main() {
        show_startup_error(&format!("{:?}", e));
        std::process::exit(1);
    }
}

#[cfg(windows)]
fn show_startup_error(message: &str) {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;

    let title = "TinyClock - Error";
    let full_message = format!("TinyClock stopped:\n\n{}", message);

    let title_wide: Vec<u16> = OsStr::new(title).encode_wide().chain(Some(0)).collect();
    let message_wide: Vec<u16> = OsStr::new(&full_message)
        .encode_wide()
        .chain(Some(0))
        .collect();

    // MB_ICONERROR = 0x10, MB_SETFOREGROUND = 0x10000, MB_TOPMOST = 0x40000
    let flags: u32 = 0x10 | 0x10000 | 0x40000;

    unsafe {
        windows_sys::Win32::UI::WindowsAndMessaging::MessageBoxW(
            0,
            message_wide.as_ptr(),
            title_wide.as_ptr(),
            flags,
        );
    }
}

#[cfg(not(windows))]
fn show_startup_error(message: &str) {
    eprintln!("TinyClock error: {}", message);
}

fn real_main() -> Result<()> {
    // Install crash handler first thing
    crash::install_panic_hook();

    let cli = Cli::parse();
    let command = cli.command();

    // The tray has no use for a console window
    #[cfg(windows)]
    if matches!(command, Command::Tray) {
        unsafe {
            windows_sys::Win32::System::Console::FreeConsole();
        }
    }

    // Loaded before logging so `[app] log_level` applies. Only the tray and
    // render commands need a usable config; the others just log with it.
    let config = Config::load(cli.config.as_deref());
    let level = cli.effective_log_level(config.as_ref().ok().and_then(|c| c.app.log_level));

    // Tray logs to a file; everything else logs to the console
    let _guard = match command {
        Command::Tray => init_file_logging(level)?,
        _ => init_console_logging(level)?,
    };

    info!(version = env!("CARGO_PKG_VERSION"), "TinyClock starting");
    match &config {
        Ok(c) if c.path.as_os_str().is_empty() => info!("Using default configuration"),
        Ok(c) => info!(path = %c.path.display(), "Configuration loaded"),
        Err(e) => warn!(error = %e, "Configuration could not be loaded"),
    }

    match command {
        Command::Tray => tray::run_tray(&config?),
        Command::Render {
            out,
            time,
            layout,
            size,
        } => cli::render::run(&config?, out, *time, *layout, *size),
        Command::Startup { action } => cli::startup::run(*action),
        Command::Config { action } => cli::config::run(*action, cli.config.as_deref()),
        Command::Version => {
            println!("tinyclock {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_console_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();

    Ok(None)
}

fn init_file_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = config::paths::log_dir()?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix("tinyclock")
        .filename_suffix("log")
        .max_log_files(7)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .json()
                .with_writer(non_blocking),
        )
        .init();

    Ok(Some(guard))
}
