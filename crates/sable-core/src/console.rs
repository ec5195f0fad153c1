//! Terminal console utilities for rich output

use std::env;
use std::io::{self, IsTerminal};

/// Width used when the terminal size is unknown
const DEFAULT_WIDTH: usize = 100;

/// Console output handler with color support and terminal width detection
#[derive(Debug, Clone)]
pub struct Console {
    color_enabled: bool,
    max_width: usize,
}

impl Console {
    /// Create a new console; colours are on when stdout is a terminal and
    /// `NO_COLOR` is unset
    pub fn new() -> Self {
        Self {
            color_enabled: io::stdout().is_terminal() && env::var_os("NO_COLOR").is_none(),
            max_width: Self::detect_terminal_width(),
        }
    }

    fn detect_terminal_width() -> usize {
        term_size::dimensions()
            .map(|(width, _)| width)
            .filter(|width| *width > 0)
            .unwrap_or(DEFAULT_WIDTH)
    }

    pub fn is_color_enabled(&self) -> bool {
        self.color_enabled
    }

    /// Colorize text with the specified color
    pub fn colorize(&self, text: &str, color: Color) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        format!("\x1b[{}m{text}\x1b[0m", color.ansi_code())
    }

    /// Terminal width, used to size separators
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Create a console with colors disabled
    pub fn no_colors() -> Self {
        Self {
            color_enabled: false,
            max_width: Self::detect_terminal_width(),
        }
    }

    /// Force colours on or off (`--no-color`)
    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.color_enabled = enabled;
        self
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// ANSI color codes for terminal output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Yellow,
    Blue,
    Green,
    Cyan,
    Magenta,
    Dim,
    Bold,
    Underline,
}

impl Color {
    fn ansi_code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Green => 32,
            Color::Cyan => 36,
            Color::Magenta => 35,
            Color::Dim => 2,
            Color::Bold => 1,
            Color::Underline => 4,
        }
    }
}
