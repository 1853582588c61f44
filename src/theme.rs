use std::cell::Cell;
use std::rc::Rc;

use anyhow::anyhow;
use clap::ValueEnum;

use crate::page::{self, Page};
use crate::store::PreferenceStore;

pub const THEME_ATTR: &str = "data-theme";

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

    /// Anything other than `dark` applies as light.
    pub fn from_value(value: &str) -> Self {
        if value.trim() == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

/// Host dark-mode signal. `Err` means the host has no such capability.
pub trait ColorScheme {
    fn prefers_dark(&self) -> anyhow::Result<bool>;
}

impl<T: ColorScheme + ?Sized> ColorScheme for Rc<T> {
    fn prefers_dark(&self) -> anyhow::Result<bool> {
        (**self).prefers_dark()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SystemScheme {
    Light,
    Dark,
    /// The host exposes no color-scheme query.
    Unavailable,
}

impl ColorScheme for SystemScheme {
    fn prefers_dark(&self) -> anyhow::Result<bool> {
        match self {
            SystemScheme::Light => Ok(false),
            SystemScheme::Dark => Ok(true),
            SystemScheme::Unavailable => Err(anyhow!("color-scheme query unavailable")),
        }
    }
}

/// A scheme the host can flip at runtime before firing a change notification.
#[derive(Debug)]
pub struct ManualScheme {
    current: Cell<SystemScheme>,
}

impl ManualScheme {
    pub fn new(initial: SystemScheme) -> Self {
        Self {
            current: Cell::new(initial),
        }
    }

    pub fn set(&self, scheme: SystemScheme) {
        self.current.set(scheme);
    }
}

impl ColorScheme for ManualScheme {
    fn prefers_dark(&self) -> anyhow::Result<bool> {
        self.current.get().prefers_dark()
    }
}

pub struct ThemeController {
    key: String,
    store: Rc<dyn PreferenceStore>,
    scheme: Rc<dyn ColorScheme>,
    current: Cell<Theme>,
}

impl ThemeController {
    pub fn new(key: &str, store: Rc<dyn PreferenceStore>, scheme: Rc<dyn ColorScheme>) -> Self {
        Self {
            key: key.to_string(),
            store,
            scheme,
            current: Cell::new(Theme::Light),
        }
    }

    pub fn current(&self) -> Theme {
        self.current.get()
    }

    pub fn init(&self, page: &Page) -> Theme {
        let theme = self.stored().unwrap_or_else(|| self.system());
        self.set(page, theme);
        theme
    }

    pub fn toggle(&self, page: &Page) -> Theme {
        let current = page
            .root()
            .and_then(|root| page::attr(&root, THEME_ATTR))
            .map(|v| Theme::from_value(&v))
            .unwrap_or(Theme::Light);
        let next = current.toggled();
        self.set(page, next);
        next
    }

    /// Follows the system only while no explicit preference is stored.
    pub fn system_changed(&self, page: &Page) -> Option<Theme> {
        if self.stored().is_some() {
            return None;
        }
        let theme = self.system();
        self.set(page, theme);
        Some(theme)
    }

    fn stored(&self) -> Option<Theme> {
        match self.store.get(&self.key) {
            Ok(Some(v)) if !v.is_empty() => Some(Theme::from_value(&v)),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "theme preference not readable");
                None
            }
        }
    }

    fn system(&self) -> Theme {
        match self.scheme.prefers_dark() {
            Ok(true) => Theme::Dark,
            Ok(false) => Theme::Light,
            Err(e) => {
                tracing::debug!(error = %e, "falling back to light theme");
                Theme::Light
            }
        }
    }

    fn set(&self, page: &Page, theme: Theme) {
        if let Some(root) = page.root() {
            page::set_attr(&root, THEME_ATTR, theme.as_str());
        }
        self.current.set(theme);
        if let Err(e) = self.store.set(&self.key, theme.as_str()) {
            tracing::debug!(error = %e, "theme preference not persisted");
        }
    }
}
