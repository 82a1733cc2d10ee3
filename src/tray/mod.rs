//! System tray icon.
//!
//! Shows the rendered clock in the notification area with a two-entry
//! context menu: the launch-at-login toggle and exit.

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::run_tray;

/// Shown where there is no tray. An autostart entry would only launch a
/// process that exits with this message.
#[cfg(not(windows))]
pub const UNSUPPORTED: &str = "System tray is only supported on Windows, so launching TinyClock at \
login has no effect here; use `tinyclock render` to preview the icon";

#[cfg(not(windows))]
pub fn run_tray(_config: &crate::config::Config) -> anyhow::Result<()> {
    anyhow::bail!(UNSUPPORTED)
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn test_tray_unavailable_explains_autostart() {
        let err = run_tray(&crate::config::Config::default()).unwrap_err();
        assert!(err.to_string().contains("at login has no effect"), "{}", err);
    }
}
