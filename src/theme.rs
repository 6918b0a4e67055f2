//! Palette: two-intensity piece colours, shading, optional btop-style theme file.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Channel levels the built-in palette is authored in (0..=15, scaled x17
/// for the terminal).
const BRIGHT: u8 = 14;
const DIM: u8 = 8;
const GREY: u8 = 11;

/// Rendering intensity for a board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    /// Landed block or live piece.
    Full,
    /// Hard-drop resting position.
    Ghost,
    /// Trail between the live piece and its resting position.
    Trail,
}

impl Shade {
    fn divider(self) -> u8 {
        match self {
            Self::Full => 1,
            Self::Ghost => 2,
            Self::Trail => 3,
        }
    }
}

/// Cell colours by stored board value (0 empty, 1..=7 per piece kind) plus
/// UI colours.
#[derive(Debug, Clone)]
pub struct Theme {
    cells: [(u8, u8, u8); 8],
    pub bg: Color,
    pub border: Color,
    pub text: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Theme {
    /// Built-in palette: per-index channel assignment over two intensity
    /// levels, grey for the Z piece, plum backdrop.
    pub fn builtin() -> Self {
        let b = BRIGHT * 17;
        let d = DIM * 17;
        let g = GREY * 17;
        Self {
            cells: [
                (0, 0, 0),
                (b, d, d), // L red
                (d, b, d), // J green
                (d, d, b), // I blue
                (b, d, b), // O magenta
                (b, b, d), // T yellow
                (d, b, b), // S cyan
                (g, g, g), // Z grey
            ],
            bg: Color::Rgb(70, 10, 50),
            border: Color::Rgb(0x3F, 0x44, 0x4F),
            text: Color::Rgb(0xAB, 0xB2, 0xBF),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="#RRGGBB"`. Falls back
    /// to the built-in palette if path is None or the file is missing; keys
    /// not present keep their built-in value.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::builtin()),
        };
        let s = std::fs::read_to_string(path)?;
        Self::from_map(&parse_theme_file(&s))
    }

    fn from_map(map: &HashMap<String, String>) -> Result<Self, ThemeError> {
        let mut theme = Self::builtin();
        const PIECE_KEYS: [&str; 7] = [
            "piece_l", "piece_j", "piece_i", "piece_o", "piece_t", "piece_s", "piece_z",
        ];
        for (i, key) in PIECE_KEYS.iter().enumerate() {
            if let Some(value) = map.get(*key) {
                theme.cells[i + 1] = parse_hex(value)?;
            }
        }
        if let Some(value) = map.get("bg") {
            let (r, g, b) = parse_hex(value)?;
            theme.bg = Color::Rgb(r, g, b);
        }
        if let Some(value) = map.get("border") {
            let (r, g, b) = parse_hex(value)?;
            theme.border = Color::Rgb(r, g, b);
        }
        if let Some(value) = map.get("text") {
            let (r, g, b) = parse_hex(value)?;
            theme.text = Color::Rgb(r, g, b);
        }
        Ok(theme)
    }

    /// Colour for a stored cell value at the given intensity. Ghost and
    /// trail shades divide each channel by 2 and 3.
    pub fn cell_color(&self, value: u8, shade: Shade) -> Color {
        let (r, g, b) = self.cells[(value as usize).min(7)];
        let d = shade.divider();
        Color::Rgb(r / d, g / d, b / d)
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse "#RRGGBB" or "#RGB" into an RGB triple.
fn parse_hex(s: &str) -> Result<(u8, u8, u8), ThemeError> {
    let s = s.trim().trim_start_matches('#');
    if s.len() == 6 {
        let r =
            u8::from_str_radix(&s[0..2], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        let g =
            u8::from_str_radix(&s[2..4], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        let b =
            u8::from_str_radix(&s[4..6], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        Ok((r, g, b))
    } else if s.len() == 3 {
        let parse = |part: &str| {
            u8::from_str_radix(part, 16)
                .map(|v| v * 17)
                .map_err(|_| ThemeError::InvalidHex(s.to_string()))
        };
        Ok((parse(&s[0..1])?, parse(&s[1..2])?, parse(&s[2..3])?))
    } else {
        Err(ThemeError::InvalidHex(s.to_string()))
    }
}
