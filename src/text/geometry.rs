//! Line and block geometry.

use super::{StyledLine, Unit};
use crate::config::LayoutConfig;
use crate::font::MetricsProvider;
use crate::style::{Style, TextAlign};
use serde::Serialize;

/// An axis-aligned rectangle; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineMetrics {
    pub width: f64,
    pub height: f64,
    pub ascender: f64,
}

/// Width and height of a run of units laid out as one line.
///
/// Height is the tallest style's ascender + |descender|, scaled by that
/// style's line height and then by the global multiplier. Any extra leading
/// is split evenly above and below the glyphs, which moves the baseline down
/// by half of it. A line with no units takes its height from `empty_style`,
/// or is zero-height without one.
pub fn measure_line<M: MetricsProvider + ?Sized>(
    metrics: &M,
    units: &[Unit],
    empty_style: Option<&Style>,
    config: &LayoutConfig,
) -> LineMetrics {
    let width = units.iter().map(Unit::width).sum();

    let mut styles: Vec<&Style> = Vec::new();
    for unit in units {
        if !styles.contains(&unit.style()) {
            styles.push(unit.style());
        }
    }
    if styles.is_empty() {
        styles.extend(empty_style);
    }

    let mut tallest = 0.0f64;
    let mut extent = 0.0f64;
    let mut ascender = 0.0f64;
    for style in styles {
        let v = metrics.vertical_metrics(&style.font_id, style.scaled_size(config.font_scale));
        tallest = tallest.max(v.extent() * style.line_height);
        extent = extent.max(v.extent());
        ascender = ascender.max(v.ascender);
    }

    // the glyph box sits centered in the scaled line box
    let height = tallest * config.line_height_multiplier;
    LineMetrics {
        width,
        height,
        ascender: ascender + (height - extent) / 2.0,
    }
}

/// Horizontal offset of a line inside a block `block_width` wide.
pub fn line_offset(align: TextAlign, block_width: f64, line_width: f64) -> f64 {
    match align {
        TextAlign::Left | TextAlign::Justify => 0.0,
        TextAlign::Right => block_width - line_width,
        TextAlign::Center => (block_width - line_width) / 2.0,
    }
}

/// Width of the widest line.
pub fn block_width(lines: &[StyledLine]) -> f64 {
    lines.iter().map(|l| l.width).fold(0.0f64, f64::max)
}

/// The rectangle covering every line when drawn at `(x, y)` with `align`.
///
/// The widest line always sits at offset zero, so the left edge is `x`
/// whatever the alignment.
pub fn bounding_box(lines: &[StyledLine], x: f64, y: f64, align: TextAlign) -> Rect {
    let width = block_width(lines);
    let left = lines
        .iter()
        .map(|l| line_offset(align, width, l.width))
        .fold(f64::INFINITY, f64::min);
    let left = if left.is_finite() { left } else { 0.0 };
    Rect {
        x: x + left,
        y,
        width,
        height: lines.iter().map(|l| l.height).sum(),
    }
}
