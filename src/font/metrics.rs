//! The measurement seam between layout and fonts.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Vertical metrics of a face at a given size, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VerticalMetrics {
    /// Distance from the baseline to the top of the face.
    pub ascender: f64,
    /// Distance from the baseline to the bottom of the face. Usually negative.
    pub descender: f64,
    /// Recommended baseline-to-baseline distance.
    pub line_height: f64,
}

impl VerticalMetrics {
    /// Ascender plus the magnitude of the descender.
    pub fn extent(&self) -> f64 {
        self.ascender + self.descender.abs()
    }
}

/// Answers width and line-metric queries for a font at a size.
///
/// Layout only ever reads through this trait. Implementations must be
/// deterministic for a given registry state.
pub trait MetricsProvider {
    /// Advance width of `text` set in `font_id` at `size` pixels.
    fn text_width(&self, font_id: &str, size: f64, text: &str) -> f64;

    fn vertical_metrics(&self, font_id: &str, size: f64) -> VerticalMetrics;

    /// The face that would actually draw `font_id` once fallbacks are
    /// applied, or `None` when nothing along the chain is loaded.
    fn resolve_face<'a>(&'a self, font_id: &'a str) -> Option<&'a str>;

    /// Split `text` into byte ranges that are each drawn by one face.
    ///
    /// Characters no face can draw are left out. The default draws the
    /// whole text with [`resolve_face`](Self::resolve_face).
    fn face_runs<'a>(&'a self, font_id: &'a str, text: &str) -> Vec<(&'a str, Range<usize>)> {
        self.resolve_face(font_id)
            .map(|face| vec![(face, 0..text.len())])
            .unwrap_or_default()
    }
}

/// Fixed-advance metrics: every character is `advance` ems wide.
///
/// Used as the best-effort default when no face resolves, and anywhere a
/// deterministic provider is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonospaceMetrics {
    pub advance: f64,
    pub ascender: f64,
    pub descender: f64,
    pub line_gap: f64,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            advance: 0.5,
            ascender: 0.8,
            descender: -0.2,
            line_gap: 0.0,
        }
    }
}

impl MonospaceMetrics {
    pub fn new(advance: f64) -> Self {
        Self {
            advance,
            ..Default::default()
        }
    }

    pub fn char_width(&self, size: f64) -> f64 {
        self.advance * size
    }

    pub fn metrics(&self, size: f64) -> VerticalMetrics {
        VerticalMetrics {
            ascender: self.ascender * size,
            descender: self.descender * size,
            line_height: (self.ascender - self.descender + self.line_gap) * size,
        }
    }
}

impl MetricsProvider for MonospaceMetrics {
    fn text_width(&self, _font_id: &str, size: f64, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width(size)
    }

    fn vertical_metrics(&self, _font_id: &str, size: f64) -> VerticalMetrics {
        self.metrics(size)
    }

    fn resolve_face<'a>(&'a self, font_id: &'a str) -> Option<&'a str> {
        Some(font_id)
    }
}
