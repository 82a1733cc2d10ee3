//! XDG autostart entry (`~/.config/autostart/<app>.desktop`).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::StartupRegistrar;
use crate::error::StartupError;

pub struct DesktopEntry {
    name: String,
    path: PathBuf,
}

impl DesktopEntry {
    /// An entry for `name` inside `autostart_dir`.
    pub fn new(autostart_dir: impl Into<PathBuf>, name: &str) -> Self {
        let path = autostart_dir
            .into()
            .join(format!("{}.desktop", name.to_lowercase()));
        Self {
            name: name.to_string(),
            path,
        }
    }

    /// An entry in the current user's autostart directory.
    pub fn user_autostart(name: &str) -> Result<Self, StartupError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            StartupError::Unavailable("no user configuration directory".to_string())
        })?;
        Ok(Self::new(config_dir.join("autostart"), name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn contents(&self, exe: &Path) -> String {
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name={name}\n\
             Exec={exec}\n\
             Terminal=false\n\
             NoDisplay=true\n\
             X-GNOME-Autostart-enabled=true\n",
            name = self.name,
            exec = quote_exec(&exe.display().to_string()),
        )
    }
}

/// Quote a program path for an `Exec=` key.
fn quote_exec(program: &str) -> String {
    let mut quoted = String::with_capacity(program.len() + 2);
    quoted.push('"');
    for c in program.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

impl StartupRegistrar for DesktopEntry {
    fn is_registered(&self) -> bool {
        self.path.is_file()
    }

    fn register(&self, exe: &Path) -> Result<(), StartupError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, self.contents(exe))?;
        Ok(())
    }

    fn unregister(&self) -> Result<(), StartupError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
