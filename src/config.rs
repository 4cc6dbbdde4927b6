//! Layout configuration.
//!
//! Passed by reference into every split, layout and draw call. A call reads
//! it once and treats it as a snapshot for its whole duration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Width of a tab, measured in spaces of the tab's own style.
    pub tab_width: u32,
    /// Multiplier applied to every line height.
    pub line_height_multiplier: f64,
    /// Rasterization density handed to the renderer on each frame.
    /// Never affects reported geometry.
    pub pixel_density: f64,
    /// Uniform multiplier applied to every style's font size.
    pub font_scale: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            line_height_multiplier: 1.0,
            pixel_density: 1.0,
            font_scale: 1.0,
        }
    }
}

impl LayoutConfig {
    pub fn with_tab_width(mut self, tab_width: u32) -> Self {
        self.tab_width = tab_width;
        self
    }

    pub fn with_line_height_multiplier(mut self, mult: f64) -> Self {
        self.line_height_multiplier = mult;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = LayoutConfig::default();
        assert_eq!(c.tab_width, 4);
        assert_eq!(c.line_height_multiplier, 1.0);
        assert_eq!(c.pixel_density, 1.0);
        assert_eq!(c.font_scale, 1.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let c: LayoutConfig =
            serde_json::from_str(r#"{ "tabWidth": 8, "pixelDensity": 2.0 }"#).expect("parses");
        assert_eq!(c.tab_width, 8);
        assert_eq!(c.pixel_density, 2.0);
        assert_eq!(c.line_height_multiplier, 1.0);
    }
}
