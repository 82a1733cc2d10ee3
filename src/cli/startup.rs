//! Startup command - launch-at-login from the console.

use anyhow::{Context, Result};

use crate::cli::StartupAction;
use crate::startup::{self, StartupRegistrar};

/// Run the startup command.
pub fn run(action: StartupAction) -> Result<()> {
    let registrar = startup::system_registrar()?;
    run_with(registrar.as_ref(), action)
}

fn run_with(registrar: &dyn StartupRegistrar, action: StartupAction) -> Result<()> {
    match action {
        StartupAction::Status => {}
        StartupAction::Enable => {
            let exe = startup::current_executable()?;
            registrar
                .register(&exe)
                .context("Could not add TinyClock to startup")?;
        }
        StartupAction::Disable => {
            registrar
                .unregister()
                .context("Could not remove TinyClock from startup")?;
        }
        StartupAction::Toggle => {
            let exe = startup::current_executable()?;
            startup::toggle_with(registrar, &exe)
                .context("Could not change startup registration")?;
        }
    }

    if registrar.is_registered() {
        println!("TinyClock starts at login.");
        #[cfg(not(windows))]
        println!("Note: {}.", crate::tray::UNSUPPORTED);
    } else {
        println!("TinyClock does not start at login.");
    }
    Ok(())
}
