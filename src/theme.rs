//! Color theme preference
//!
//! The active theme is persisted under `core::theme`. Without a stored value the
//! terminal background is detected from `COLORFGBG`.

use crate::error::StoreError;
use crate::store::KeyValueStore;
use owo_colors::OwoColorize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const THEME_KEY: &str = "core::theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Headings and names
    pub fn accent(self, text: &str) -> String {
        match self {
            Theme::Dark => text.bright_cyan().bold().to_string(),
            Theme::Light => text.blue().bold().to_string(),
        }
    }

    /// Secondary details (digests, hints)
    pub fn muted(self, text: &str) -> String {
        match self {
            Theme::Dark => text.bright_black().to_string(),
            Theme::Light => text.dimmed().to_string(),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

/// Theme from a `COLORFGBG` value (`"<fg>;<bg>"`). Dark backgrounds are the low ANSI
/// colors other than 7 (white).
pub fn theme_from_colorfgbg(value: &str) -> Option<Theme> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(if background < 7 || background == 8 {
        Theme::Dark
    } else {
        Theme::Light
    })
}

pub fn detect_system_theme() -> Theme {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|value| theme_from_colorfgbg(&value))
        .unwrap_or(Theme::Light)
}

pub struct ThemeManager {
    store: Arc<dyn KeyValueStore>,
    current: Theme,
}

impl ThemeManager {
    /// Load the stored theme (or the detected one) and persist it as active.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let mut manager = Self {
            store,
            current: Theme::Light,
        };
        let theme = manager.get_theme(true)?;
        manager.set_theme(theme)?;
        Ok(manager)
    }

    /// Stored theme when `cached` and valid, else the detected system theme.
    pub fn get_theme(&self, cached: bool) -> Result<Theme, StoreError> {
        if cached {
            if let Some(theme) = self
                .store
                .get(THEME_KEY)?
                .and_then(|value| value.parse().ok())
            {
                return Ok(theme);
            }
        }
        Ok(detect_system_theme())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StoreError> {
        self.current = theme;
        self.store.set(THEME_KEY, theme.as_str())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, StoreError> {
        let theme = self.current.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    pub fn current(&self) -> Theme {
        self.current
    }
}
