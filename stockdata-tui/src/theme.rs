//! Parrot/neon theme tokens for the StockData TUI
//!
//! # Color Palette
//! - **Accent**: Electric cyan (focus, progress)
//! - **Positive**: Neon green (success banners, logged-in state)
//! - **Negative**: Hot pink (errors)
//! - **Warning**: Neon orange (warnings, missing data)
//! - **Muted**: Steel blue (hints, inactive borders)

use ratatui::style::{Color, Modifier, Style};

use crate::app::BannerLevel;

/// Parrot/neon palette
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Electric cyan accent (focus, highlights)
    pub accent: Color,
    /// Neon green (success)
    pub positive: Color,
    /// Hot pink (errors)
    pub negative: Color,
    /// Neon orange (warnings)
    pub warning: Color,
    /// Steel blue (muted text, inactive)
    pub muted: Color,
    /// White (primary text)
    pub text_primary: Color,
}

impl Theme {
    pub fn banner_color(&self, level: BannerLevel) -> Color {
        match level {
            BannerLevel::Success => self.positive,
            BannerLevel::Info => self.accent,
            BannerLevel::Warning => self.warning,
            BannerLevel::Error => self.negative,
        }
    }
}

const THEME: Theme = Theme {
    accent: Color::Rgb(0, 255, 255),
    positive: Color::Rgb(0, 255, 128),
    negative: Color::Rgb(255, 20, 147),
    warning: Color::Rgb(255, 140, 0),
    muted: Color::Rgb(100, 149, 237),
    text_primary: Color::White,
};

pub fn accent() -> Style {
    Style::default().fg(THEME.accent)
}

pub fn positive() -> Style {
    Style::default().fg(THEME.positive)
}

pub fn warning() -> Style {
    Style::default().fg(THEME.warning)
}

pub fn muted() -> Style {
    Style::default().fg(THEME.muted)
}

pub fn text() -> Style {
    Style::default().fg(THEME.text_primary)
}

pub fn banner(level: BannerLevel) -> Style {
    Style::default().fg(THEME.banner_color(level))
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    panel_border(active).add_modifier(Modifier::BOLD)
}

/// Focused form field or button.
pub fn focused() -> Style {
    accent().add_modifier(Modifier::BOLD | Modifier::REVERSED)
}
