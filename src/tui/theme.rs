use ratatui::style::{Color, Modifier, Style};
use tracing::warn;

use crate::storage::Storage;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Stored preference, or dark when nothing valid is stored.
    pub fn load<S: Storage>(storage: &S) -> Self {
        match storage.get(THEME_KEY) {
            Ok(Some(value)) if value.trim() == "light" => Self::Light,
            Ok(_) => Self::Dark,
            Err(e) => {
                warn!(error = %e, "failed to read theme preference");
                Self::Dark
            }
        }
    }

    pub fn save<S: Storage>(&self, storage: &mut S) {
        if let Err(e) = storage.set(THEME_KEY, self.as_str()) {
            warn!(error = %e, "failed to persist theme preference");
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Self::Dark => Palette {
                text: Color::Rgb(250, 250, 250),
                muted: Color::Rgb(113, 113, 122),
                accent: Color::Rgb(16, 185, 129),
                surface: Color::Rgb(24, 24, 27),
                error: Color::Rgb(239, 68, 68),
            },
            Self::Light => Palette {
                text: Color::Rgb(24, 24, 27),
                muted: Color::Rgb(82, 82, 91),
                accent: Color::Rgb(5, 150, 105),
                surface: Color::Rgb(244, 244, 245),
                error: Color::Rgb(220, 38, 38),
            },
        }
    }
}

/// Colors used by every component for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub surface: Color,
    pub error: Color,
}

impl Palette {
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.surface)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted).bg(self.surface)
    }

    pub fn border(&self, focused: bool) -> Style {
        let color = if focused { self.accent } else { self.muted };
        Style::default().fg(color).bg(self.surface)
    }

    pub fn highlight(&self) -> Style {
        Style::default().fg(self.surface).bg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error).bg(self.surface)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.accent).bg(self.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_toggle_round_trips_through_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(Theme::load(&storage), Theme::Dark);

        let theme = Theme::load(&storage).toggled();
        theme.save(&mut storage);
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("light"));
        assert_eq!(Theme::load(&storage), Theme::Light);
    }

    #[test]
    fn test_unknown_value_falls_back_to_dark() {
        let mut storage = MemoryStorage::new();
        storage.set(THEME_KEY, "solarized").unwrap();
        assert_eq!(Theme::load(&storage), Theme::Dark);
    }

    #[test]
    fn test_palettes_differ() {
        assert_ne!(Theme::Dark.palette(), Theme::Light.palette());
    }
}
