//! # Style System
//!
//! Text styles and the registry that names them. A style is a plain value:
//! two styles with equal fields are interchangeable, and the layout core
//! never looks at the font ID beyond handing it to a metrics provider.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything needed to measure and draw a run of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Font identifier, as registered with the font registry.
    pub font_id: String,
    /// Font size in pixels, before the global font scale.
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Text color.
    #[serde(default)]
    pub color: Color,
    /// Line height as a multiplier of the font's natural line height.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    /// Extra advance added after every character, in pixels.
    #[serde(default)]
    pub letter_spacing: f64,
}

fn default_font_size() -> f64 {
    12.0
}

fn default_line_height() -> f64 {
    1.0
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_id: String::new(),
            font_size: default_font_size(),
            color: Color::BLACK,
            line_height: default_line_height(),
            letter_spacing: 0.0,
        }
    }
}

impl Style {
    pub fn new(font_id: &str, font_size: f64) -> Self {
        Self {
            font_id: font_id.to_string(),
            font_size,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// The size actually handed to the metrics provider and renderer.
    pub fn scaled_size(&self, font_scale: f64) -> f64 {
        self.font_size * font_scale
    }
}

/// Horizontal alignment of lines within their block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    /// Accepted for compatibility; laid out and drawn as `Left`.
    Justify,
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`. Anything else is `None`.
    pub fn hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f64 / 255.0);
        match hex.len() {
            3 => Some(Self::rgb(
                channel(hex[0..1].repeat(2).as_str())?,
                channel(hex[1..2].repeat(2).as_str())?,
                channel(hex[2..3].repeat(2).as_str())?,
            )),
            6 | 8 => {
                let a = if hex.len() == 8 {
                    channel(&hex[6..8])?
                } else {
                    1.0
                };
                Some(Self {
                    r: channel(&hex[0..2])?,
                    g: channel(&hex[2..4])?,
                    b: channel(&hex[4..6])?,
                    a,
                })
            }
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Named styles, looked up by the markup parser and by callers.
///
/// Mutated only through [`StyleRegistry::add_style`]; layout borrows it
/// read-only.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    styles: HashMap<String, Style>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a style under `id`, replacing any previous style with that ID.
    pub fn add_style(&mut self, id: &str, style: Style) {
        self.styles.insert(id.to_string(), style);
    }

    pub fn style_exists(&self, id: &str) -> bool {
        self.styles.contains_key(id)
    }

    pub fn get_style(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    /// Iterate over all registered styles.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Style)> {
        self.styles.iter()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
