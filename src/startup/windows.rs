//! `HKCU\Software\Microsoft\Windows\CurrentVersion\Run` entry.

use std::io::ErrorKind;
use std::path::Path;

use winreg::enums::{HKEY_CURRENT_USER, KEY_READ, KEY_SET_VALUE};
use winreg::RegKey;

use super::StartupRegistrar;
use crate::error::StartupError;

const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

pub struct RunKey {
    subkey: String,
    name: String,
}

impl RunKey {
    pub fn new(name: &str) -> Self {
        Self::under(RUN_KEY, name)
    }

    /// A value named `name` under an arbitrary HKCU subkey.
    pub fn under(subkey: &str, name: &str) -> Self {
        Self {
            subkey: subkey.to_string(),
            name: name.to_string(),
        }
    }
}

impl StartupRegistrar for RunKey {
    fn is_registered(&self) -> bool {
        RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey_with_flags(&self.subkey, KEY_READ)
            .and_then(|key| key.get_raw_value(&self.name))
            .is_ok()
    }

    fn register(&self, exe: &Path) -> Result<(), StartupError> {
        let (key, _) = RegKey::predef(HKEY_CURRENT_USER).create_subkey(&self.subkey)?;
        // Run values are command lines; quote so paths with spaces survive.
        key.set_value(&self.name, &format!("\"{}\"", exe.display()))?;
        Ok(())
    }

    fn unregister(&self) -> Result<(), StartupError> {
        let key = match RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey_with_flags(&self.subkey, KEY_SET_VALUE)
        {
            Ok(key) => key,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        match key.delete_value(&self.name) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
