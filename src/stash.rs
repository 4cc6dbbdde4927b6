//! The long-lived context: fonts, named styles and configuration in one
//! place, plus the parse → layout → draw compositions most callers want.

use crate::config::LayoutConfig;
use crate::error::StashError;
use crate::font::{FontContext, MetricsProvider, VerticalMetrics};
use crate::markup;
use crate::render::{self, Renderer};
use crate::style::{Style, StyleRegistry, TextAlign};
use crate::text::geometry::{self, Rect};
use crate::text::{self, LineLayout, StyledFragment, StyledLine};
use std::path::Path;

/// Fonts, styles and layout configuration.
///
/// Measurement goes through `M`. The default, [`FontContext`], loads real
/// faces; any other [`MetricsProvider`] can stand in via
/// [`FontStash::with_metrics`]. Registries change only through the `add_*`
/// methods. Every layout and draw call reads `config` once at the start.
#[derive(Debug, Default)]
pub struct FontStash<M = FontContext> {
    metrics: M,
    styles: StyleRegistry,
    /// Style of untagged markup, and of empty lines with nothing else to
    /// size them.
    default_style: Style,
    pub config: LayoutConfig,
}

impl FontStash<FontContext> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    // ── Fonts ──────────────────────────────────────────────────

    pub fn add_font(&mut self, font_id: &str, path: impl AsRef<Path>) -> Result<(), StashError> {
        self.metrics.registry_mut().add_font(font_id, path)
    }

    pub fn add_font_data(&mut self, font_id: &str, data: &[u8]) -> Result<(), StashError> {
        self.metrics.registry_mut().add_font_data(font_id, data)
    }

    pub fn is_font_loaded(&self, font_id: &str) -> bool {
        self.metrics.registry().is_font_loaded(font_id)
    }

    pub fn add_fallback_font(&mut self, font_id: &str, fallback_id: &str) {
        self.metrics
            .registry_mut()
            .add_fallback_font(font_id, fallback_id);
    }

    /// Set the fallback for all fonts. Only the first call takes effect.
    pub fn set_global_fallback_font(&mut self, font_id: &str) -> bool {
        self.metrics.registry().set_global_fallback_font(font_id)
    }

    pub fn global_fallback_font(&self) -> Option<&str> {
        self.metrics.registry().global_fallback_font()
    }

    pub fn fonts(&self) -> &FontContext {
        &self.metrics
    }
}

impl<M: MetricsProvider> FontStash<M> {
    /// A stash that measures with `metrics`.
    pub fn with_metrics(metrics: M) -> Self {
        Self {
            metrics,
            styles: StyleRegistry::new(),
            default_style: Style::default(),
            config: LayoutConfig::default(),
        }
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    // ── Styles ─────────────────────────────────────────────────

    pub fn add_style(&mut self, style_id: &str, style: Style) {
        self.styles.add_style(style_id, style);
    }

    pub fn style_exists(&self, style_id: &str) -> bool {
        self.styles.style_exists(style_id)
    }

    pub fn get_style(&self, style_id: &str) -> Option<&Style> {
        self.styles.get_style(style_id)
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn set_default_style(&mut self, style: Style) {
        self.default_style = style;
    }

    pub fn default_style(&self) -> &Style {
        &self.default_style
    }

    // ── Configuration ──────────────────────────────────────────

    pub fn set_line_height_mult(&mut self, mult: f64) {
        self.config.line_height_multiplier = mult;
    }

    pub fn vertical_metrics(&self, style: &Style) -> VerticalMetrics {
        self.metrics
            .vertical_metrics(&style.font_id, style.scaled_size(self.config.font_scale))
    }

    // ── Layout ─────────────────────────────────────────────────

    /// Parse markup; untagged text gets the default style.
    pub fn parse_styled_text(&self, markup: &str) -> Vec<StyledFragment> {
        markup::parse_styled_text(&self.styles, &self.default_style, markup)
    }

    pub fn layout_lines(
        &self,
        fragments: &[StyledFragment],
        target_width: f64,
        max_lines: usize,
        debug: bool,
    ) -> LineLayout {
        text::layout_lines_with_empty_style(
            &self.metrics,
            fragments,
            target_width,
            max_lines,
            &self.config,
            Some(&self.default_style),
            debug,
        )
    }

    /// Lay out without a width limit. Newlines are not supported on this
    /// path and collapse to spaces.
    fn layout_single_line(&self, fragments: &[StyledFragment]) -> StyledLine {
        let flattened: Vec<StyledFragment> = fragments
            .iter()
            .map(|f| {
                if f.text.contains(['\n', '\r']) {
                    log::warn!("newlines are not supported in single-line text, collapsing");
                    StyledFragment::new(&f.text.replace(['\n', '\r'], " "), f.style.clone())
                } else {
                    f.clone()
                }
            })
            .collect();
        let mut layout = text::layout_lines_with_empty_style(
            &self.metrics,
            &flattened,
            f64::INFINITY,
            0,
            &self.config,
            Some(&self.default_style),
            false,
        );
        // an unbounded width with no newlines always yields exactly one line
        layout.lines.swap_remove(0)
    }

    // ── Bounds ─────────────────────────────────────────────────

    /// Bounds of `text` drawn on one line at `(x, y)`, without drawing.
    pub fn text_bounds(&self, text: &str, style: &Style, x: f64, y: f64) -> Rect {
        let line = self.layout_single_line(&[StyledFragment::new(text, style.clone())]);
        geometry::bounding_box(std::slice::from_ref(&line), x, y, TextAlign::Left)
    }

    pub fn lines_bounds(&self, lines: &[StyledLine], x: f64, y: f64, align: TextAlign) -> Rect {
        geometry::bounding_box(lines, x, y, align)
    }

    // ── Drawing ────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub fn draw_lines<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        lines: &[StyledLine],
        x: f64,
        y: f64,
        align: TextAlign,
        debug: bool,
    ) -> Rect {
        render::draw_lines(
            &self.metrics,
            renderer,
            lines,
            x,
            y,
            align,
            &self.config,
            debug,
        )
    }

    /// Draw a single line of text. Returns its width.
    pub fn draw<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        text: &str,
        style: &Style,
        x: f64,
        y: f64,
    ) -> f64 {
        let line = self.layout_single_line(&[StyledFragment::new(text, style.clone())]);
        self.draw_lines(renderer, std::slice::from_ref(&line), x, y, TextAlign::Left, false)
            .width
    }

    /// Draw a single line of markup. Returns its width.
    pub fn draw_formatted<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        markup: &str,
        x: f64,
        y: f64,
    ) -> f64 {
        let line = self.layout_single_line(&self.parse_styled_text(markup));
        self.draw_lines(renderer, std::slice::from_ref(&line), x, y, TextAlign::Left, false)
            .width
    }

    /// Break `text` to `width` and draw it. Newlines force line ends.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_column<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        text: &str,
        style: &Style,
        x: f64,
        y: f64,
        width: f64,
        align: TextAlign,
        debug: bool,
    ) -> Rect {
        let fragments = [StyledFragment::new(text, style.clone())];
        self.draw_and_layout(renderer, &fragments, x, y, width, align, debug)
    }

    /// Parse markup, break it to `width` and draw it.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_formatted_column<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        markup: &str,
        x: f64,
        y: f64,
        width: f64,
        align: TextAlign,
        debug: bool,
    ) -> Rect {
        let fragments = self.parse_styled_text(markup);
        self.draw_and_layout(renderer, &fragments, x, y, width, align, debug)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_and_layout<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        fragments: &[StyledFragment],
        x: f64,
        y: f64,
        width: f64,
        align: TextAlign,
        debug: bool,
    ) -> Rect {
        let layout = self.layout_lines(fragments, width, 0, debug);
        self.draw_lines(renderer, &layout.lines, x, y, align, debug)
    }
}
