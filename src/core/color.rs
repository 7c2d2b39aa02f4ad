//! Terminal colors and level-to-color mapping

use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// ANSI foreground colors supported for levels and message overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// Default color for a level when no override is configured
    pub fn default_for(level: LogLevel) -> Self {
        match level {
            LogLevel::Info => Color::Cyan,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
            LogLevel::Debug => Color::Magenta,
        }
    }
}

impl From<Color> for colored::Color {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => colored::Color::Black,
            Color::Red => colored::Color::Red,
            Color::Green => colored::Color::Green,
            Color::Yellow => colored::Color::Yellow,
            Color::Blue => colored::Color::Blue,
            Color::Magenta => colored::Color::Magenta,
            Color::Cyan => colored::Color::Cyan,
            Color::White => colored::Color::White,
        }
    }
}

/// Wrap `text` in the SGR sequence for `color`, resetting afterwards
///
/// The sequence is always emitted, independent of TTY detection and
/// `NO_COLOR`, so every transport sees the same bytes.
pub fn colorize(text: &str, color: Color) -> String {
    format!("\x1b[{}m{}\x1b[0m", colored::Color::from(color).to_fg_str(), text)
}

/// Remove every ANSI escape sequence from `input`
///
/// Other control characters except newlines are dropped as well.
pub fn strip_ansi(input: &str) -> String {
    strip_ansi_escapes::strip_str(input)
}

/// Resolves the display color of a level, honoring user overrides
#[derive(Debug, Clone, Default)]
pub struct ColorManager {
    overrides: HashMap<LogLevel, Color>,
}

impl ColorManager {
    pub fn new(overrides: HashMap<LogLevel, Color>) -> Self {
        Self { overrides }
    }

    pub fn get_level_color(&self, level: LogLevel) -> Color {
        self.overrides
            .get(&level)
            .copied()
            .unwrap_or_else(|| Color::default_for(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_colors() {
        let manager = ColorManager::default();
        assert_eq!(manager.get_level_color(LogLevel::Info), Color::Cyan);
        assert_eq!(manager.get_level_color(LogLevel::Warn), Color::Yellow);
        assert_eq!(manager.get_level_color(LogLevel::Error), Color::Red);
        assert_eq!(manager.get_level_color(LogLevel::Debug), Color::Magenta);
    }

    #[test]
    fn test_override_wins() {
        let mut overrides = HashMap::new();
        overrides.insert(LogLevel::Info, Color::Green);
        let manager = ColorManager::new(overrides);

        assert_eq!(manager.get_level_color(LogLevel::Info), Color::Green);
        assert_eq!(manager.get_level_color(LogLevel::Warn), Color::Yellow);
    }

    #[test]
    fn test_colorize_and_strip() {
        let painted = colorize("hello", Color::Blue);
        assert_eq!(painted, "\x1b[34mhello\x1b[0m");
        assert_eq!(strip_ansi(&painted), "hello");
    }

    #[test]
    fn test_sgr_codes_match_the_standard_table() {
        let expected = [
            (Color::Black, 30),
            (Color::Red, 31),
            (Color::Green, 32),
            (Color::Yellow, 33),
            (Color::Blue, 34),
            (Color::Magenta, 35),
            (Color::Cyan, 36),
            (Color::White, 37),
        ];
        for (color, code) in expected {
            assert_eq!(colorize("x", color), format!("\x1b[{}mx\x1b[0m", code));
        }
    }

    #[test]
    fn test_strip_removes_compound_sequences() {
        assert_eq!(strip_ansi("a\x1b[1;31mb\x1b[0mc"), "abc");
        assert_eq!(strip_ansi("line one\nline two"), "line one\nline two");
        assert_eq!(strip_ansi("plain ünïcode"), "plain ünïcode");
    }
}
