//! FILENAME: core/engine/src/style.rs
//! PURPOSE: Visual style primitives shared by cells and shapes.
//! CONTEXT: Theme resolution lives outside this crate; what is here is the
//! vocabulary a theme resolves INTO (colors, text styles) plus the default
//! per-cell-kind palettes used when no theme is supplied.

use serde::{Deserialize, Serialize};

/// Horizontal text alignment inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    Left,
    Center,
    #[default]
    Right,
}

/// Vertical alignment inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// RGBA color. (De)serializes as a hex string ("#30BF78", "#30BF7880").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8, // Alpha channel (255 = opaque)
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub const fn black() -> Self {
        Color::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Color::new(255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Color::with_alpha(0, 0, 0, 0)
    }

    /// Convert to a CSS color string.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.2})",
                self.r,
                self.g,
                self.b,
                self.a as f32 / 255.0
            )
        }
    }

    /// Parse from hex string (e.g., "#FF0000", "FF0000" or "#FF000080").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Color::new(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Color::with_alpha(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            3 => {
                // Short form "#abc" -> "#aabbcc"
                let expand = |i: usize| {
                    let c = u8::from_str_radix(hex.get(i..i + 1)?, 16).ok()?;
                    Some(c * 17)
                };
                Some(Color::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    /// Hex form including alpha when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color: {}", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Style of one text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub fill: Color,
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub opacity: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            fill: Color::new(0x00, 0x00, 0x00),
            font_size: 12.0,
            font_weight: FontWeight::Normal,
            text_align: TextAlign::Right,
            vertical_align: VerticalAlign::Middle,
            opacity: 1.0,
        }
    }
}

impl TextStyle {
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub fn bold(mut self) -> Self {
        self.font_weight = FontWeight::Bold;
        self
    }

    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }
}

/// Resolved palette for one kind of cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellTheme {
    pub background: Color,
    pub border: Color,
    pub border_width: f64,
    pub text: TextStyle,
    /// Style for total / parent rows.
    pub bolder_text: TextStyle,
    pub padding: f64,
    pub hover_overlay: Color,
    pub selected_border: Color,
    /// Opacity applied to cells outside the selection when spotlighting.
    pub unselected_opacity: f64,
}

impl Default for CellTheme {
    fn default() -> Self {
        CellTheme::data_cell()
    }
}

impl CellTheme {
    pub fn data_cell() -> Self {
        CellTheme {
            background: Color::white(),
            border: Color::new(0xE1, 0xEA, 0xFE),
            border_width: 1.0,
            text: TextStyle::default(),
            bolder_text: TextStyle::default().bold(),
            padding: 8.0,
            hover_overlay: Color::with_alpha(0xE1, 0xEA, 0xFE, 0x80),
            selected_border: Color::new(0x5B, 0x8F, 0xF9),
            unselected_opacity: 0.2,
        }
    }

    pub fn header() -> Self {
        CellTheme {
            background: Color::new(0xF5, 0xF8, 0xFE),
            text: TextStyle::default().aligned(TextAlign::Left),
            bolder_text: TextStyle::default().aligned(TextAlign::Left).bold(),
            ..CellTheme::data_cell()
        }
    }

    pub fn corner() -> Self {
        CellTheme {
            background: Color::new(0xE1, 0xEA, 0xFE),
            text: TextStyle::default().aligned(TextAlign::Left).bold(),
            ..CellTheme::header()
        }
    }
}
