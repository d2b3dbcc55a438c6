//! Color theme system for redline.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI
//! surface redline renders. Two built-in themes are provided:
//!
//! - `dark` uses ANSI 16 colors so it works on any terminal, including
//!   256-color SSH sessions with no truecolor support.
//! - `catppuccin_mocha` uses the Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;

/// All color values used across redline's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub border_active: Color,
    pub border_inactive: Color,

    // Candidate tokens
    /// Plain, unredacted word.
    pub token_word: Color,
    /// Background of the word under the cursor.
    pub token_cursor_bg: Color,
    /// Redaction marker.
    pub token_redacted: Color,
    /// Placeholder drawn for empty tokens.
    pub token_empty: Color,

    // Changes panel
    pub diff_added: Color,
    pub diff_removed: Color,
    pub diff_context: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_mode_normal: Color,
    pub status_mode_insert: Color,

    // Feedback messages
    pub feedback_info: Color,
    pub feedback_success: Color,
    pub feedback_failure: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            token_word: Color::Reset,
            token_cursor_bg: Color::DarkGray,
            token_redacted: Color::Red,
            token_empty: Color::DarkGray,

            diff_added: Color::Green,
            diff_removed: Color::Red,
            diff_context: Color::Reset,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,

            feedback_info: Color::White,
            feedback_success: Color::Green,
            feedback_failure: Color::LightRed,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161);    // #a6e3a1
        let red = Color::Rgb(243, 139, 168);      // #f38ba8
        let peach = Color::Rgb(250, 179, 135);    // #fab387
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90);    // #45475a
        let text = Color::Rgb(205, 214, 244);     // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            token_word: text,
            token_cursor_bg: surface1,
            token_redacted: red,
            token_empty: overlay1,

            diff_added: green,
            diff_removed: red,
            diff_context: text,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,

            feedback_info: text,
            feedback_success: green,
            feedback_failure: peach,
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}
