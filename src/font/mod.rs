//! # Font Management
//!
//! Loading fonts, resolving a font ID through its fallback chain, and
//! answering metric queries for layout.
//!
//! Faces are parsed once with ttf-parser at registration time; layout only
//! ever sees the extracted advances and vertical metrics.

pub mod metrics;

pub use metrics::{MetricsProvider, MonospaceMetrics, VerticalMetrics};

use crate::error::StashError;
use std::cell::OnceCell;
use std::collections::HashMap;
use std::fs;
use std::ops::Range;
use std::path::Path;

/// Metrics extracted from a TrueType/OpenType face.
#[derive(Debug, Clone)]
pub struct FaceMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
}

impl FaceMetrics {
    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Result<Self, ttf_parser::FaceParsingError> {
        let face = ttf_parser::Face::parse(data, 0)?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        // Sample the BMP to build the width map
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(FaceMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
        })
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.advance_widths.contains_key(&ch)
    }

    fn scale(&self, size: f64) -> f64 {
        size / self.units_per_em.max(1) as f64
    }

    /// Advance width of a character in pixels.
    pub fn char_width(&self, ch: char, size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        w as f64 * self.scale(size)
    }

    pub fn vertical_metrics(&self, size: f64) -> VerticalMetrics {
        let scale = self.scale(size);
        let ascender = self.ascender as f64 * scale;
        let descender = self.descender as f64 * scale;
        VerticalMetrics {
            ascender,
            descender,
            line_height: ascender - descender + self.line_gap as f64 * scale,
        }
    }
}

/// Maps font IDs to loaded faces, with per-font fallback chains and a single
/// global fallback that can be set only once.
#[derive(Debug, Default)]
pub struct FontRegistry {
    faces: HashMap<String, FaceMetrics>,
    fallbacks: HashMap<String, Vec<String>>,
    global_fallback: OnceCell<String>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font from a file on disk.
    pub fn add_font(&mut self, id: &str, path: impl AsRef<Path>) -> Result<(), StashError> {
        let data = fs::read(path)?;
        self.add_font_data(id, &data)
    }

    /// Register a font from raw bytes, replacing any face already under `id`.
    pub fn add_font_data(&mut self, id: &str, data: &[u8]) -> Result<(), StashError> {
        let metrics = FaceMetrics::from_font_data(data).map_err(|source| StashError::FontParse {
            id: id.to_string(),
            source,
        })?;
        log::debug!(
            "loaded font '{}' ({} glyphs sampled)",
            id,
            metrics.advance_widths.len()
        );
        self.faces.insert(id.to_string(), metrics);
        Ok(())
    }

    pub fn is_font_loaded(&self, id: &str) -> bool {
        self.faces.contains_key(id)
    }

    pub fn face(&self, id: &str) -> Option<&FaceMetrics> {
        self.faces.get(id)
    }

    /// Append `fallback_id` to the fallback chain of `font_id`.
    ///
    /// Either font may be registered later; the chain is resolved at lookup.
    pub fn add_fallback_font(&mut self, font_id: &str, fallback_id: &str) {
        self.fallbacks
            .entry(font_id.to_string())
            .or_default()
            .push(fallback_id.to_string());
    }

    /// Set the fallback used by every font. Returns `false`, leaving the
    /// first value in place, if one was already set.
    pub fn set_global_fallback_font(&self, id: &str) -> bool {
        match self.global_fallback.set(id.to_string()) {
            Ok(()) => true,
            Err(rejected) => {
                log::warn!(
                    "global fallback font already set to '{}', ignoring '{}'",
                    self.global_fallback.get().map(String::as_str).unwrap_or(""),
                    rejected
                );
                false
            }
        }
    }

    pub fn global_fallback_font(&self) -> Option<&str> {
        self.global_fallback.get().map(String::as_str)
    }

    /// The lookup order for `font_id`: itself, its own fallbacks, then the
    /// global fallback.
    pub fn fallback_chain<'a>(&'a self, font_id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        std::iter::once(font_id)
            .chain(
                self.fallbacks
                    .get(font_id)
                    .into_iter()
                    .flatten()
                    .map(String::as_str),
            )
            .chain(self.global_fallback_font())
    }

    /// First loaded face ID along the fallback chain.
    pub fn resolve_face<'a>(&'a self, font_id: &'a str) -> Option<&'a str> {
        self.fallback_chain(font_id)
            .find(|id| self.faces.contains_key(*id))
    }

    /// ID of the face that draws `ch`: the first face along the chain that
    /// has a glyph for it, otherwise the first loaded face.
    pub fn face_id_for_char<'a>(&'a self, font_id: &'a str, ch: char) -> Option<&'a str> {
        self.fallback_chain(font_id)
            .find(|id| self.faces.get(*id).is_some_and(|face| face.has_glyph(ch)))
            .or_else(|| self.resolve_face(font_id))
    }

    pub fn face_for_char(&self, font_id: &str, ch: char) -> Option<&FaceMetrics> {
        self.face_id_for_char(font_id, ch)
            .and_then(|id| self.faces.get(id))
    }
}

/// Metrics provider backed by a [`FontRegistry`].
///
/// Fonts that resolve to nothing are measured with `default_metrics` so
/// layout still produces sensible geometry.
#[derive(Debug, Default)]
pub struct FontContext {
    registry: FontRegistry,
    default_metrics: MonospaceMetrics,
}

impl FontContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_metrics(default_metrics: MonospaceMetrics) -> Self {
        Self {
            registry: FontRegistry::new(),
            default_metrics,
        }
    }

    /// Advance width of a single character, following per-glyph fallbacks.
    pub fn char_width(&self, ch: char, font_id: &str, size: f64) -> f64 {
        match self.registry.face_for_char(font_id, ch) {
            Some(face) => face.char_width(ch, size),
            None => self.default_metrics.char_width(size),
        }
    }

    /// Access the underlying font registry.
    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }

    /// Access the underlying font registry mutably.
    pub fn registry_mut(&mut self) -> &mut FontRegistry {
        &mut self.registry
    }
}

impl MetricsProvider for FontContext {
    fn text_width(&self, font_id: &str, size: f64, text: &str) -> f64 {
        if self.registry.resolve_face(font_id).is_none() {
            log::trace!("no face for '{}', measuring with defaults", font_id);
        }
        text.chars().map(|ch| self.char_width(ch, font_id, size)).sum()
    }

    fn vertical_metrics(&self, font_id: &str, size: f64) -> VerticalMetrics {
        match self
            .registry
            .resolve_face(font_id)
            .and_then(|id| self.registry.face(id))
        {
            Some(face) => face.vertical_metrics(size),
            None => self.default_metrics.metrics(size),
        }
    }

    fn resolve_face<'a>(&'a self, font_id: &'a str) -> Option<&'a str> {
        self.registry.resolve_face(font_id)
    }

    /// Runs follow the same per-glyph fallback as [`FontContext::char_width`],
    /// so each glyph is drawn by the face it was measured with.
    fn face_runs<'a>(&'a self, font_id: &'a str, text: &str) -> Vec<(&'a str, Range<usize>)> {
        let mut runs: Vec<(&'a str, Range<usize>)> = Vec::new();
        for (i, ch) in text.char_indices() {
            let Some(face) = self.registry.face_id_for_char(font_id, ch) else {
                continue;
            };
            let end = i + ch.len_utf8();
            match runs.last_mut() {
                Some((last, range)) if *last == face && range.end == i => range.end = end,
                _ => runs.push((face, i..end)),
            }
        }
        runs
    }
}
