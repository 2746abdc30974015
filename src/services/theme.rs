use crate::events::{EventBus, PortalEvent};
use crate::models::{Theme, UnknownTheme};
use crate::storage::{SharedStore, keys};

/// Persisted light/dark display preference.
///
/// Storage problems never escape this type: they are logged and the preference
/// carries on in memory.
pub struct ThemePreference {
    store: SharedStore,
    events: EventBus,
    current: Theme,
}

impl ThemePreference {
    /// Resolve the initial theme and apply it.
    ///
    /// A valid stored preference wins, then the host's color-scheme preference,
    /// then [`Theme::Light`].
    pub fn new(store: SharedStore, events: EventBus, system_prefers_dark: bool) -> Self {
        let mut preference = Self {
            store,
            events,
            current: Theme::default(),
        };

        let initial = preference
            .stored_theme()
            .unwrap_or_else(|| Theme::from_system(system_prefers_dark));
        preference.apply(initial);
        preference
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// Switch between light and dark, returning the new theme.
    pub fn toggle(&mut self) -> Theme {
        let next = self.current.toggled();
        self.apply(next);
        next
    }

    /// Apply a theme by name. Only `light` and `dark` are accepted.
    pub fn set(&mut self, name: &str) -> Result<Theme, UnknownTheme> {
        let theme = name.parse::<Theme>()?;
        self.apply(theme);
        Ok(theme)
    }

    /// Follow a change of the host color scheme, unless the user picked a theme.
    pub fn system_preference_changed(&mut self, prefers_dark: bool) -> Option<Theme> {
        if self.stored_theme().is_some() {
            return None;
        }
        let theme = Theme::from_system(prefers_dark);
        self.apply(theme);
        Some(theme)
    }

    pub fn apply(&mut self, theme: Theme) {
        self.current = theme;
        self.store_theme(theme);

        tracing::info!("Theme changed to {} mode", theme);
        self.events.emit(PortalEvent::ThemeChanged { theme });
    }

    fn stored_theme(&self) -> Option<Theme> {
        match self.store.get(keys::THEME_PREFERENCE) {
            Ok(Some(raw)) => match raw.parse() {
                Ok(theme) => Some(theme),
                Err(e) => {
                    tracing::debug!("Ignoring stored theme preference: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Unable to read theme preference: {}", e);
                None
            }
        }
    }

    fn store_theme(&self, theme: Theme) {
        if let Err(e) = self.store.set(keys::THEME_PREFERENCE, theme.as_str()) {
            tracing::warn!("Unable to store theme preference: {}", e);
        }
    }
}
