use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ReaderError;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Label for the switcher, naming the action it performs next.
    pub fn switch_label(self) -> &'static str {
        match self {
            Theme::Light => "🌙 Dark Mode",
            Theme::Dark => "☀️ Light Mode",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ReaderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ReaderError::InvalidTheme(value.to_string())),
        }
    }
}

/// Process-wide theme flag, optionally persisted to a small JSON file.
#[derive(Clone)]
pub struct ThemeStore {
    shared: Arc<ThemeShared>,
}

struct ThemeShared {
    current: RwLock<Theme>,
    path: Option<PathBuf>,
}

#[derive(Serialize, Deserialize)]
struct ThemeFile {
    theme: Theme,
}

impl ThemeStore {
    /// Loads the saved theme from `path`, defaulting to light when the file
    /// is missing or unreadable.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let theme = load_theme(&path);
        Self::with_state(theme, Some(path))
    }

    pub fn ephemeral() -> Self {
        Self::with_state(Theme::default(), None)
    }

    fn with_state(theme: Theme, path: Option<PathBuf>) -> Self {
        Self {
            shared: Arc::new(ThemeShared {
                current: RwLock::new(theme),
                path,
            }),
        }
    }

    pub fn get(&self) -> Theme {
        *self.shared.current.read()
    }

    pub fn set(&self, theme: Theme) {
        let mut guard = self.shared.current.write();
        *guard = theme;
        self.persist(theme);
    }

    pub fn toggle(&self) -> Theme {
        let mut guard = self.shared.current.write();
        let next = guard.toggled();
        *guard = next;
        self.persist(next);
        next
    }

    fn persist(&self, theme: Theme) {
        let Some(path) = &self.shared.path else {
            return;
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(error = %err, "failed to create theme directory");
                return;
            }
        }
        let bytes = match serde_json::to_vec(&ThemeFile { theme }) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "failed to serialize theme");
                return;
            }
        };
        if let Err(err) = fs::write(path, bytes) {
            warn!(error = %err, path = %path.display(), "failed to write theme file");
        }
    }
}

fn load_theme(path: &Path) -> Theme {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(error = %err, path = %path.display(), "no saved theme");
            return Theme::default();
        }
    };
    match serde_json::from_str::<ThemeFile>(&raw) {
        Ok(file) => file.theme,
        Err(err) => {
            warn!(error = %err, path = %path.display(), "ignoring unreadable theme file");
            Theme::default()
        }
    }
}
