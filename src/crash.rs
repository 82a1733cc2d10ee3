//! Crash reporting and panic handling.

use std::backtrace::Backtrace;
use std::fs;
use std::panic::PanicHookInfo;

use crate::config::paths;

/// Install the panic hook for crash reporting.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        handle_panic(panic_info);
    }));
}

fn handle_panic(panic_info: &PanicHookInfo) {
    let backtrace = Backtrace::force_capture();
    let report = build_crash_report(panic_info, &backtrace);
    let crash_file = write_crash_report(&report);

    tracing::error!(
        thread = std::thread::current().name().unwrap_or("unnamed"),
        crash_file = crash_file.as_deref().unwrap_or("(not written)"),
        "TinyClock panicked"
    );

    show_crash_dialog(crash_file.as_deref());
}

fn panic_message(panic_info: &PanicHookInfo) -> String {
    if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn build_crash_report(panic_info: &PanicHookInfo, backtrace: &Backtrace) -> String {
    let version = env!("CARGO_PKG_VERSION");
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let message = panic_message(panic_info);
    let location = panic_info
        .location()
        .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
        .unwrap_or_else(|| "unknown location".to_string());
    let os_info = format!("{} {}", std::env::consts::OS, std::env::consts::ARCH);

    format!(
        r#"TinyClock Crash Report
======================

Version: {version}
Timestamp: {timestamp}
OS: {os_info}

Panic Message:
{message}

Location:
{location}

Backtrace:
{backtrace}
"#
    )
}

fn write_crash_report(report: &str) -> Option<String> {
    let log_dir = paths::log_dir().ok()?;

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let path = log_dir.join(format!("crash_{}.txt", timestamp));

    fs::write(&path, report).ok()?;
    Some(path.display().to_string())
}

#[cfg(windows)]
fn show_crash_dialog(crash_file: Option<&str>) {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;

    let file_info = crash_file
        .map(|f| format!("\n\nCrash report saved to:\n{}", f))
        .unwrap_or_default();
    let message = format!("TinyClock has crashed unexpectedly.{}", file_info);
    let title = "TinyClock - Crash";

    let title_wide: Vec<u16> = OsStr::new(title).encode_wide().chain(Some(0)).collect();
    let message_wide: Vec<u16> = OsStr::new(&message).encode_wide().chain(Some(0)).collect();

    // MB_OK = 0, MB_ICONERROR = 0x10
    let flags: u32 = 0x10;

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
fn show_crash_dialog(crash_file: Option<&str>) {
    eprintln!("TinyClock crashed!");
    if let Some(f) = crash_file {
        eprintln!("Crash report saved to: {}", f);
    }
}
