//! # Rendering
//!
//! Walks finished lines and issues one draw per face run of each visible
//! unit, so glyphs taken from a fallback face are drawn with that face. The
//! backend behind [`Renderer`] does the rasterizing; this module only places
//! pens.

use crate::config::LayoutConfig;
use crate::font::MetricsProvider;
use crate::style::{Color, TextAlign};
use crate::text::geometry::{self, Rect};
use crate::text::{StyledLine, Unit};
use serde::Serialize;
use std::ops::{Deref, DerefMut};

/// Color of line-box overlays drawn in debug mode.
pub const DEBUG_LINE_COLOR: Color = Color {
    r: 1.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

/// Color of baseline overlays drawn in debug mode.
pub const DEBUG_BASELINE_COLOR: Color = Color {
    r: 0.0,
    g: 0.4,
    b: 1.0,
    a: 0.8,
};

/// A drawing backend.
pub trait Renderer {
    /// Prepare backend state for a batch of draws at the given density.
    fn begin_frame(&mut self, pixel_density: f64);

    /// Draw `text` in `face` with its baseline starting at `(x, y)`.
    /// Every glyph of `text` is one `face` can draw.
    fn draw_unit(&mut self, face: &str, size: f64, color: Color, text: &str, x: f64, y: f64);

    /// Diagnostic overlay. A zero-height rectangle is a horizontal rule.
    fn draw_debug_rect(&mut self, _rect: Rect, _color: Color) {}

    /// Restore whatever `begin_frame` changed.
    fn end_frame(&mut self);
}

/// Brackets a batch of draws: begins the frame on creation and ends it on
/// drop, so the backend is restored even if drawing stops early.
pub struct FrameGuard<'a, R: Renderer + ?Sized> {
    renderer: &'a mut R,
}

impl<'a, R: Renderer + ?Sized> FrameGuard<'a, R> {
    pub fn new(renderer: &'a mut R, pixel_density: f64) -> Self {
        renderer.begin_frame(pixel_density);
        Self { renderer }
    }
}

impl<R: Renderer + ?Sized> Deref for FrameGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.renderer
    }
}

impl<R: Renderer + ?Sized> DerefMut for FrameGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.renderer
    }
}

impl<R: Renderer + ?Sized> Drop for FrameGuard<'_, R> {
    fn drop(&mut self) {
        self.renderer.end_frame();
    }
}

/// Draw laid-out lines with the top-left of the block at `(x, y)`.
///
/// Each line starts at its aligned offset and sits below the previous one.
/// Units whose font resolves to no face are skipped but still advance the
/// pen. Returns the same rectangle as [`geometry::bounding_box`].
#[allow(clippy::too_many_arguments)]
pub fn draw_lines<M, R>(
    metrics: &M,
    renderer: &mut R,
    lines: &[StyledLine],
    x: f64,
    y: f64,
    align: TextAlign,
    config: &LayoutConfig,
    debug: bool,
) -> Rect
where
    M: MetricsProvider + ?Sized,
    R: Renderer + ?Sized,
{
    if align == TextAlign::Justify {
        log::warn!("justified text is not supported, drawing left-aligned");
    }
    let mut frame = FrameGuard::new(renderer, config.pixel_density);
    let block_width = geometry::block_width(lines);
    let mut top = y;

    for line in lines {
        let line_x = x + geometry::line_offset(align, block_width, line.width);
        let baseline = top + line.ascender;
        let mut pen_x = line_x;

        for unit in &line.units {
            if unit.kind().is_drawn() {
                draw_unit_runs(metrics, &mut *frame, unit, pen_x, baseline, config);
            }
            pen_x += unit.width();
        }

        if debug {
            frame.draw_debug_rect(
                Rect::new(line_x, top, line.width, line.height),
                DEBUG_LINE_COLOR,
            );
            frame.draw_debug_rect(
                Rect::new(line_x, baseline, line.width, 0.0),
                DEBUG_BASELINE_COLOR,
            );
        }

        top += line.height;
    }

    geometry::bounding_box(lines, x, y, align)
}

/// Draw one unit, one call per face run. Each run starts where the glyphs
/// before it end, measured the same way the unit was.
fn draw_unit_runs<M, R>(
    metrics: &M,
    renderer: &mut R,
    unit: &Unit,
    pen_x: f64,
    baseline: f64,
    config: &LayoutConfig,
) where
    M: MetricsProvider + ?Sized,
    R: Renderer + ?Sized,
{
    let style = unit.style();
    let size = style.scaled_size(config.font_scale);
    let text = unit.text();
    let runs = metrics.face_runs(&style.font_id, text);
    if runs.is_empty() {
        log::warn!("no face for font '{}', skipping {:?}", style.font_id, text);
        return;
    }
    for (face, range) in runs {
        let before = &text[..range.start];
        let offset = if before.is_empty() {
            0.0
        } else {
            metrics.text_width(&style.font_id, size, before)
                + style.letter_spacing * before.chars().count() as f64
        };
        renderer.draw_unit(face, size, style.color, &text[range], pen_x + offset, baseline);
    }
}

/// Draw commands captured by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    BeginFrame {
        pixel_density: f64,
    },
    Text {
        face: String,
        size: f64,
        color: Color,
        text: String,
        x: f64,
        y: f64,
    },
    DebugRect {
        rect: Rect,
        color: Color,
    },
    EndFrame,
}

/// A renderer that records what it was asked to draw.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text draws, in order.
    pub fn texts(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { .. }))
    }
}

impl Renderer for RecordingRenderer {
    fn begin_frame(&mut self, pixel_density: f64) {
        self.commands.push(DrawCommand::BeginFrame { pixel_density });
    }

    fn draw_unit(&mut self, face: &str, size: f64, color: Color, text: &str, x: f64, y: f64) {
        self.commands.push(DrawCommand::Text {
            face: face.to_string(),
            size,
            color,
            text: text.to_string(),
            x,
            y,
        });
    }

    fn draw_debug_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::DebugRect { rect, color });
    }

    fn end_frame(&mut self) {
        self.commands.push(DrawCommand::EndFrame);
    }
}
