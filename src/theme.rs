//! Fixed color palette for the terminal UI.

use ratatui::style::Color;

#[derive(Clone)]
pub struct Theme {
    pub background: Color,
    pub page_frame: Color,
    pub panel_border: Color,
    /// Panels whose rectangle came from a reviewed source.
    pub panel_verified: Color,
    /// The panel the reader is currently on.
    pub panel_current: Color,
    pub text: Color,
    pub text_dim: Color,
    pub accent: Color,
}

/// Oceanic-flavored defaults for dark terminals.
pub const DEFAULT_THEME: Theme = Theme {
    background: Color::Rgb(0x1B, 0x2B, 0x34),
    page_frame: Color::Rgb(0xA7, 0xAD, 0xBA),
    panel_border: Color::Rgb(0x4F, 0x5B, 0x66),
    panel_verified: Color::Rgb(0x99, 0xC7, 0x94),
    panel_current: Color::Rgb(0xFA, 0xC8, 0x63),
    text: Color::Rgb(0xC0, 0xC5, 0xCE),
    text_dim: Color::Rgb(0x65, 0x73, 0x7E),
    accent: Color::Rgb(0x66, 0x99, 0xCC),
};
