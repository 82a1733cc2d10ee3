//! Menu strings per system language.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
    Fr,
    Es,
    Zh,
}

/// Texts shown in the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuTexts {
    pub startup_label: &'static str,
    pub exit_label: &'static str,
}

impl Language {
    /// Parse a locale identifier such as `de`, `de-AT`, `zh_CN.UTF-8` or
    /// `pt-BR`. Only the primary subtag is looked at.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .split(|c: char| c == '-' || c == '_' || c == '.' || c == '@')
            .next()?
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Language::En),
            "de" => Some(Language::De),
            "fr" => Some(Language::Fr),
            "es" => Some(Language::Es),
            "zh" => Some(Language::Zh),
            _ => None,
        }
    }

    /// The system language, or English when it is unknown or unsupported.
    pub fn detect() -> Self {
        let locale = sys_locale::get_locale();
        let language = locale
            .as_deref()
            .and_then(Self::from_tag)
            .unwrap_or_default();
        debug!(locale = ?locale, language = ?language, "Detected menu language");
        language
    }

    pub fn texts(self) -> MenuTexts {
        match self {
            Language::En => MenuTexts {
                startup_label: "Start at login",
                exit_label: "Exit",
            },
            Language::De => MenuTexts {
                startup_label: "Bei Anmeldung starten",
                exit_label: "Beenden",
            },
            Language::Fr => MenuTexts {
                startup_label: "Lancer à l'ouverture de session",
                exit_label: "Quitter",
            },
            Language::Es => MenuTexts {
                startup_label: "Iniciar al iniciar sesión",
                exit_label: "Salir",
            },
            Language::Zh => MenuTexts {
                startup_label: "登录时启动",
                exit_label: "退出",
            },
        }
    }
}
