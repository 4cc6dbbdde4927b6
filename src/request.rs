//! JSON request and report types used by [`crate::render_json`] and the CLI.

use crate::config::LayoutConfig;
use crate::error::StashError;
use crate::font::{FontContext, MonospaceMetrics};
use crate::render::{DrawCommand, RecordingRenderer};
use crate::stash::FontStash;
use crate::style::{Style, TextAlign};
use crate::text::geometry::Rect;
use crate::text::StyledLine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A full layout job: what to load, what to lay out, and where.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Font ID → path of a TTF/OTF file.
    #[serde(default)]
    pub fonts: BTreeMap<String, String>,
    /// Font ID → fallback font IDs, tried in order.
    #[serde(default)]
    pub fallbacks: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub global_fallback: Option<String>,
    /// Style ID → style, usable as tags in `text`.
    #[serde(default)]
    pub styles: BTreeMap<String, Style>,
    /// Style for untagged text.
    #[serde(default)]
    pub default_style: Option<Style>,
    /// Markup to lay out.
    pub text: String,
    /// Column width. Omitted means a single unbounded line.
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub max_lines: usize,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub config: LayoutConfig,
    /// Metrics used for fonts that resolve to no face.
    #[serde(default)]
    pub default_metrics: MonospaceMetrics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub lines: Vec<StyledLine>,
    pub bbox: Rect,
    pub truncated: bool,
    pub consumed: usize,
    pub total: usize,
    pub commands: Vec<DrawCommand>,
}

impl Request {
    /// Load fonts and styles into a fresh stash.
    pub fn build_stash(&self) -> Result<FontStash, StashError> {
        let mut stash = FontStash::with_metrics(FontContext::with_default_metrics(self.default_metrics));
        stash.config = self.config;
        for (id, path) in &self.fonts {
            stash.add_font(id, path)?;
        }
        for (id, chain) in &self.fallbacks {
            for fallback in chain {
                stash.add_fallback_font(id, fallback);
            }
        }
        if let Some(id) = &self.global_fallback {
            stash.set_global_fallback_font(id);
        }
        for (id, style) in &self.styles {
            stash.add_style(id, style.clone());
        }
        if let Some(style) = &self.default_style {
            stash.set_default_style(style.clone());
        }
        Ok(stash)
    }

    /// Parse, lay out and draw into a recording renderer.
    pub fn run(&self) -> Result<Report, StashError> {
        let stash = self.build_stash()?;
        let fragments = stash.parse_styled_text(&self.text);

        let width = self.width.unwrap_or(f64::INFINITY);
        let layout = stash.layout_lines(&fragments, width, self.max_lines, self.debug);

        let mut renderer = RecordingRenderer::new();
        let bbox = stash.draw_lines(
            &mut renderer,
            &layout.lines,
            self.x,
            self.y,
            self.align,
            self.debug,
        );

        Ok(Report {
            truncated: layout.is_truncated(),
            consumed: layout.consumed,
            total: layout.total,
            lines: layout.lines,
            bbox,
            commands: renderer.commands,
        })
    }
}
