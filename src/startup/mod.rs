//! Launch-at-login registration.
//!
//! A single auto-start entry keyed by the application name. The registered
//! state is never cached: every query goes back to the OS location.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::StartupError;

mod desktop_entry;
#[cfg(windows)]
mod windows;

pub use desktop_entry::DesktopEntry;
#[cfg(windows)]
pub use windows::RunKey;

/// Name of the auto-start entry.
pub const APP_NAME: &str = "TinyClock";

#[cfg_attr(test, mockall::automock)]
pub trait StartupRegistrar {
    /// True if the entry exists, wherever it points.
    fn is_registered(&self) -> bool;

    /// Create or overwrite the entry so it launches `path`.
    fn register(&self, path: &Path) -> Result<(), StartupError>;

    /// Remove the entry. Removing an absent entry succeeds.
    fn unregister(&self) -> Result<(), StartupError>;
}

/// The registrar for the current platform.
pub fn system_registrar() -> Result<Box<dyn StartupRegistrar>, StartupError> {
    #[cfg(windows)]
    {
        Ok(Box::new(RunKey::new(APP_NAME)))
    }

    #[cfg(not(windows))]
    {
        Ok(Box::new(DesktopEntry::user_autostart(APP_NAME)?))
    }
}

pub fn current_executable() -> Result<PathBuf, StartupError> {
    std::env::current_exe().map_err(StartupError::CurrentExe)
}

/// Flip the registration for the running executable. Returns the new state.
pub fn toggle<R: StartupRegistrar + ?Sized>(registrar: &R) -> Result<bool, StartupError> {
    flip(registrar, current_executable)
}

/// Flip the registration, registering `exe` when currently absent.
pub fn toggle_with<R: StartupRegistrar + ?Sized>(registrar: &R, exe: &Path) -> Result<bool, StartupError> {
    flip(registrar, || Ok(exe.to_path_buf()))
}

fn flip<R, F>(registrar: &R, exe: F) -> Result<bool, StartupError>
where
    R: StartupRegistrar + ?Sized,
    F: FnOnce() -> Result<PathBuf, StartupError>,
{
    if registrar.is_registered() {
        registrar.unregister()?;
        info!(app = APP_NAME, "Removed from startup");
        Ok(false)
    } else {
        let exe = exe()?;
        registrar.register(&exe)?;
        info!(app = APP_NAME, path = %exe.display(), "Added to startup");
        Ok(true)
    }
}
