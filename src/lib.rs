//! # Stylewrap
//!
//! Styled-text line breaking and metrics.
//!
//! Text arrives as runs of styled fragments, each with its own font, size
//! and color. Stylewrap splits those runs into measured units, packs the
//! units greedily into lines no wider than a target width, and reports the
//! geometry of the result. Drawing goes through a [`render::Renderer`], so
//! the same layout feeds any rasterizer.
//!
//! Layout never fails. Unknown fonts are measured with default metrics,
//! oversized words get a line of their own, and malformed markup degrades
//! to literal text.
//!
//! ## Architecture
//!
//! ```text
//! Input (markup / fragments / JSON)
//!       ↓
//!   [markup]   : Tags → styled fragments
//!       ↓
//!   [text]     : Split into measured units, break into lines
//!       ↓         (widths via [font]: registry, fallbacks, MetricsProvider)
//!   [geometry] : Line heights, alignment offsets, bounding boxes
//!       ↓
//!   [render]   : Pen placement into a Renderer backend
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod markup;
pub mod render;
pub mod request;
pub mod stash;
pub mod style;
pub mod text;

pub use config::LayoutConfig;
pub use error::StashError;
pub use stash::FontStash;
pub use style::{Color, Style, TextAlign};
pub use text::{LineLayout, StyledFragment, StyledLine};

use request::{Report, Request};

/// Run a layout job described as JSON.
///
/// Loads the requested fonts and styles, lays out the markup and draws it
/// into a recording renderer. The report carries the lines, the bounding
/// box and every draw command issued.
pub fn render_json(json: &str) -> Result<Report, StashError> {
    let request: Request = serde_json::from_str(json)?;
    request.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json_reports_geometry() {
        let report = render_json(r#"{ "text": "a bb ccc", "width": 24 }"#).expect("renders");
        // default metrics at 12px: 6px per character
        assert_eq!(report.lines.len(), 2);
        assert_eq!(report.bbox.width, 24.0);
        assert!((report.bbox.height - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_json_rejects_bad_json() {
        let err = render_json("{ \"text\": ").expect_err("truncated");
        assert!(matches!(err, StashError::Json { .. }));
    }
}
