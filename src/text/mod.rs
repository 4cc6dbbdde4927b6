//! # Text Layout
//!
//! Splitting styled fragments into measured units, and greedy line breaking
//! of those units into width-constrained lines.
//!
//! Widths are measured once, at split time. Re-breaking the same units at a
//! different width never touches the metrics provider for widths again.

pub mod geometry;

use crate::config::LayoutConfig;
use crate::font::MetricsProvider;
use crate::style::Style;
use serde::Serialize;
use std::fmt;

/// A run of text sharing one style, before word splitting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledFragment {
    pub text: String,
    pub style: Style,
}

impl StyledFragment {
    pub fn new(text: &str, style: Style) -> Self {
        Self {
            text: text.to_string(),
            style,
        }
    }
}

/// What a unit is, as far as line breaking is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitKind {
    /// A maximal run of non-whitespace characters.
    Word,
    /// Whitespace that always occupies its width (tabs, em spaces, ...).
    Separator,
    /// A space: occupies its width mid-line, vanishes at a line edge.
    SeparatorInvisible,
    /// A literal newline. Forces a line end and is never placed on a line.
    LineBreak,
}

impl UnitKind {
    /// Whether the renderer issues a draw for units of this kind.
    pub fn is_drawn(self) -> bool {
        matches!(self, UnitKind::Word | UnitKind::Separator)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitKind::Word => "WORD",
            UnitKind::Separator => "SEPARATOR",
            UnitKind::SeparatorInvisible => "SEPARATOR_INVISIBLE",
            UnitKind::LineBreak => "LINE_BREAK",
        };
        f.write_str(name)
    }
}

/// The atomic breakable element. Kind and width are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    text: String,
    style: Style,
    kind: UnitKind,
    width: f64,
}

impl Unit {
    pub fn new(text: &str, style: Style, kind: UnitKind, width: f64) -> Self {
        Self {
            text: text.to_string(),
            style,
            kind,
            width,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn width(&self) -> f64 {
        self.width
    }
}

/// A finished line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledLine {
    pub units: Vec<Unit>,
    /// Sum of unit widths. Edge spaces were never placed, so they add nothing.
    pub width: f64,
    pub height: f64,
    /// Distance from the top of the line box to its baseline.
    pub ascender: f64,
}

impl StyledLine {
    pub fn text(&self) -> String {
        self.units.iter().map(Unit::text).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// The result of breaking a unit sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineLayout {
    pub lines: Vec<StyledLine>,
    /// How many input units were processed before layout stopped.
    pub consumed: usize,
    /// How many units the splitter produced.
    pub total: usize,
}

impl LineLayout {
    /// True when a line limit cut layout short.
    pub fn is_truncated(&self) -> bool {
        self.consumed < self.total
    }
}

fn measure_unit<M: MetricsProvider + ?Sized>(
    metrics: &M,
    text: &str,
    style: &Style,
    config: &LayoutConfig,
) -> f64 {
    let size = style.scaled_size(config.font_scale);
    metrics.text_width(&style.font_id, size, text)
        + style.letter_spacing * text.chars().count() as f64
}

fn classify(ch: char) -> Option<UnitKind> {
    match ch {
        '\n' | '\r' => Some(UnitKind::LineBreak),
        ' ' => Some(UnitKind::SeparatorInvisible),
        // no-break space glues words together
        '\u{00A0}' => None,
        c if c.is_whitespace() => Some(UnitKind::Separator),
        _ => None,
    }
}

/// Split styled fragments into measured units, preserving order.
///
/// Words are maximal non-whitespace runs. Every whitespace character is its
/// own unit: spaces are invisible separators, tabs are separators of
/// `tab_width` space-widths, newlines (`\n`, `\r\n`, `\r`) are line breaks.
pub fn split_units<M: MetricsProvider + ?Sized>(
    metrics: &M,
    fragments: &[StyledFragment],
    config: &LayoutConfig,
) -> Vec<Unit> {
    let mut units = Vec::new();

    for fragment in fragments {
        let style = &fragment.style;
        let mut word = String::new();
        let mut chars = fragment.text.chars().peekable();

        while let Some(ch) = chars.next() {
            let Some(kind) = classify(ch) else {
                word.push(ch);
                continue;
            };

            if !word.is_empty() {
                let width = measure_unit(metrics, &word, style, config);
                units.push(Unit::new(&word, style.clone(), UnitKind::Word, width));
                word.clear();
            }

            let unit = match kind {
                UnitKind::LineBreak => {
                    if ch == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    Unit::new("\n", style.clone(), UnitKind::LineBreak, 0.0)
                }
                UnitKind::Separator if ch == '\t' => {
                    let space = measure_unit(metrics, " ", style, config);
                    Unit::new(
                        "\t",
                        style.clone(),
                        UnitKind::Separator,
                        space * config.tab_width as f64,
                    )
                }
                _ => {
                    let text = ch.to_string();
                    let width = measure_unit(metrics, &text, style, config);
                    Unit::new(&text, style.clone(), kind, width)
                }
            };
            log::trace!("{} {:?} w={}", unit.kind, unit.text, unit.width);
            units.push(unit);
        }

        if !word.is_empty() {
            let width = measure_unit(metrics, &word, style, config);
            units.push(Unit::new(&word, style.clone(), UnitKind::Word, width));
        }
    }

    units
}

/// Close the current line: drop trailing spaces and measure what is left.
///
/// `empty_style` gives a line with no units its height.
fn close_line<M: MetricsProvider + ?Sized>(
    metrics: &M,
    config: &LayoutConfig,
    mut units: Vec<Unit>,
    empty_style: Option<&Style>,
) -> StyledLine {
    while units
        .last()
        .is_some_and(|u| u.kind == UnitKind::SeparatorInvisible)
    {
        units.pop();
    }
    let m = geometry::measure_line(metrics, &units, empty_style, config);
    StyledLine {
        units,
        width: m.width,
        height: m.height,
        ascender: m.ascender,
    }
}

/// Greedily pack units into lines no wider than `target_width`.
///
/// A unit that fits exactly fits. A unit that overflows an empty line is
/// placed anyway, so an oversized word gets a line to itself. Spaces that
/// would start a line are dropped and spaces that end one are trimmed.
/// With `max_lines > 0` layout stops once that many lines are complete;
/// compare [`LineLayout::consumed`] with [`LineLayout::total`] to detect it.
/// Spaces left over at that point are counted as consumed, since they would
/// have been dropped at the start of the next line anyway.
///
/// Always returns at least one line, possibly empty.
pub fn break_units<M: MetricsProvider + ?Sized>(
    metrics: &M,
    units: Vec<Unit>,
    target_width: f64,
    max_lines: usize,
    config: &LayoutConfig,
    empty_style: Option<&Style>,
) -> LineLayout {
    let total = units.len();
    let mut lines: Vec<StyledLine> = Vec::new();
    let mut current: Vec<Unit> = Vec::new();
    let mut running = 0.0;
    let mut consumed = 0;

    let limit_reached = |lines: &Vec<StyledLine>| max_lines > 0 && lines.len() >= max_lines;
    let mut units = units.into_iter().peekable();
    // a visible unit was left over when the limit stopped layout
    let mut cut = false;

    loop {
        if limit_reached(&lines) {
            break;
        }
        let Some(unit) = units.next() else {
            break;
        };

        if unit.kind == UnitKind::LineBreak {
            let line_units = std::mem::take(&mut current);
            lines.push(close_line(metrics, config, line_units, Some(&unit.style)));
            running = 0.0;
            consumed += 1;
            continue;
        }

        if unit.kind == UnitKind::SeparatorInvisible && current.is_empty() {
            consumed += 1;
            continue;
        }

        if running + unit.width > target_width && !current.is_empty() {
            let line_units = std::mem::take(&mut current);
            lines.push(close_line(metrics, config, line_units, empty_style));
            running = 0.0;

            if unit.kind == UnitKind::SeparatorInvisible {
                consumed += 1;
                continue;
            }
            if limit_reached(&lines) {
                cut = true;
                break;
            }
        }

        running += unit.width;
        current.push(unit);
        consumed += 1;
    }

    if !cut {
        // spaces that would only open the next line are dropped, not cut off
        while units
            .next_if(|u| u.kind == UnitKind::SeparatorInvisible)
            .is_some()
        {
            consumed += 1;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(close_line(metrics, config, current, empty_style));
    }

    LineLayout {
        lines,
        consumed,
        total,
    }
}

/// Split `fragments` and break them into lines of at most `target_width`.
///
/// Alignment plays no part here; it is applied when drawing or measuring
/// bounds, so the same lines serve every alignment. Empty lines take their
/// height from the first fragment's style.
pub fn layout_lines<M: MetricsProvider + ?Sized>(
    metrics: &M,
    fragments: &[StyledFragment],
    target_width: f64,
    max_lines: usize,
    config: &LayoutConfig,
    debug: bool,
) -> LineLayout {
    layout_lines_with_empty_style(metrics, fragments, target_width, max_lines, config, None, debug)
}

/// Like [`layout_lines`], with `empty_style` sizing empty lines when there
/// is no fragment to take a style from (empty markup, `<b></b>`).
pub fn layout_lines_with_empty_style<M: MetricsProvider + ?Sized>(
    metrics: &M,
    fragments: &[StyledFragment],
    target_width: f64,
    max_lines: usize,
    config: &LayoutConfig,
    empty_style: Option<&Style>,
    debug: bool,
) -> LineLayout {
    let units = split_units(metrics, fragments, config);
    let empty_style = fragments.first().map(|f| &f.style).or(empty_style);
    let layout = break_units(metrics, units, target_width, max_lines, config, empty_style);

    if debug {
        for (i, line) in layout.lines.iter().enumerate() {
            let units: Vec<String> = line
                .units
                .iter()
                .map(|u| format!("{} {:?} ({:.2})", u.kind, u.text, u.width))
                .collect();
            log::debug!(
                "line {}: width={:.2} height={:.2} [{}]",
                i,
                line.width,
                line.height,
                units.join(", ")
            );
        }
        if layout.is_truncated() {
            log::debug!(
                "layout stopped after {} of {} units (max_lines={})",
                layout.consumed,
                layout.total,
                max_lines
            );
        }
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::MonospaceMetrics;

    /// One width unit per character at size 1.
    fn unit_metrics() -> MonospaceMetrics {
        MonospaceMetrics::new(1.0)
    }

    fn plain(text: &str) -> Vec<StyledFragment> {
        vec![StyledFragment::new(text, Style::new("mono", 1.0))]
    }

    fn line_texts(layout: &LineLayout) -> Vec<String> {
        layout.lines.iter().map(StyledLine::text).collect()
    }

    #[test]
    fn test_split_words_and_spaces() {
        let m = unit_metrics();
        let units = split_units(&m, &plain("a bb ccc"), &LayoutConfig::default());
        let kinds: Vec<UnitKind> = units.iter().map(Unit::kind).collect();
        assert_eq!(
            kinds,
            vec![
                UnitKind::Word,
                UnitKind::SeparatorInvisible,
                UnitKind::Word,
                UnitKind::SeparatorInvisible,
                UnitKind::Word,
            ]
        );
        let widths: Vec<f64> = units.iter().map(Unit::width).collect();
        assert_eq!(widths, vec![1.0, 1.0, 2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_split_tab_width() {
        let m = unit_metrics();
        let fragments = vec![StyledFragment::new("a\tb", Style::new("mono", 2.0))];
        let config = LayoutConfig::default().with_tab_width(4);
        let units = split_units(&m, &fragments, &config);
        assert_eq!(units.len(), 3);
        assert_eq!(units[1].kind(), UnitKind::Separator);
        assert_eq!(units[1].width(), 8.0);
    }

    #[test]
    fn test_split_crlf_is_one_break() {
        let m = unit_metrics();
        let units = split_units(&m, &plain("a\r\nb\rc"), &LayoutConfig::default());
        let breaks = units
            .iter()
            .filter(|u| u.kind() == UnitKind::LineBreak)
            .count();
        assert_eq!(breaks, 2);
        assert_eq!(units.len(), 5);
    }

    #[test]
    fn test_split_nbsp_stays_in_word() {
        let m = unit_metrics();
        let units = split_units(&m, &plain("10\u{00A0}kg"), &LayoutConfig::default());
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind(), UnitKind::Word);
    }

    #[test]
    fn test_split_keeps_fragment_styles() {
        let m = unit_metrics();
        let fragments = vec![
            StyledFragment::new("big ", Style::new("mono", 2.0)),
            StyledFragment::new("small", Style::new("mono", 1.0)),
        ];
        let units = split_units(&m, &fragments, &LayoutConfig::default());
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].width(), 6.0);
        assert_eq!(units[1].width(), 2.0);
        assert_eq!(units[2].width(), 5.0);
        assert_eq!(units[2].style().font_size, 1.0);
    }

    #[test]
    fn test_split_letter_spacing_and_font_scale() {
        let m = unit_metrics();
        let mut style = Style::new("mono", 1.0);
        style.letter_spacing = 0.5;
        let config = LayoutConfig {
            font_scale: 2.0,
            ..Default::default()
        };
        let units = split_units(&m, &[StyledFragment::new("abc", style)], &config);
        // 3 chars * 2.0 + 3 * 0.5
        assert_eq!(units[0].width(), 7.5);
    }

    #[test]
    fn test_exact_fit_then_wrap() {
        let m = unit_metrics();
        let layout = layout_lines(&m, &plain("a bb ccc"), 4.0, 0, &LayoutConfig::default(), false);
        assert_eq!(line_texts(&layout), vec!["a bb", "ccc"]);
        assert_eq!(layout.lines[0].width, 4.0);
        assert_eq!(layout.lines[1].width, 3.0);
        assert_eq!(layout.lines[0].units.len(), 3);
        assert!(!layout.is_truncated());
    }

    #[test]
    fn test_oversized_word_gets_own_line() {
        let m = unit_metrics();
        let layout = layout_lines(&m, &plain("abcdefghij"), 4.0, 0, &LayoutConfig::default(), false);
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.lines[0].width, 10.0);
    }

    #[test]
    fn test_oversized_word_mid_text() {
        let m = unit_metrics();
        let layout = layout_lines(&m, &plain("a abcdefgh b"), 4.0, 0, &LayoutConfig::default(), false);
        assert_eq!(line_texts(&layout), vec!["a", "abcdefgh", "b"]);
    }

    #[test]
    fn test_empty_input_gives_one_empty_line() {
        let m = unit_metrics();
        let layout = layout_lines(&m, &plain(""), 10.0, 0, &LayoutConfig::default(), false);
        assert_eq!(layout.lines.len(), 1);
        assert!(layout.lines[0].is_empty());
        assert_eq!(layout.lines[0].width, 0.0);
        assert_eq!(layout.lines[0].height, 1.0);
    }

    #[test]
    fn test_no_fragments_take_height_from_empty_style() {
        let m = unit_metrics();
        let style = Style::new("mono", 12.0);
        let layout = layout_lines_with_empty_style(
            &m,
            &[],
            10.0,
            0,
            &LayoutConfig::default(),
            Some(&style),
            false,
        );
        assert_eq!(layout.lines.len(), 1);
        assert!(layout.lines[0].is_empty());
        assert!((layout.lines[0].height - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_fragment_style_beats_empty_style() {
        let m = unit_metrics();
        let layout = layout_lines_with_empty_style(
            &m,
            &[StyledFragment::new("", Style::new("mono", 3.0))],
            10.0,
            0,
            &LayoutConfig::default(),
            Some(&Style::new("mono", 12.0)),
            false,
        );
        assert!((layout.lines[0].height - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_fragments_gives_zero_height_line() {
        let m = unit_metrics();
        let layout = layout_lines(&m, &[], 10.0, 0, &LayoutConfig::default(), false);
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.lines[0].height, 0.0);
    }

    #[test]
    fn test_leading_and_trailing_spaces_collapse() {
        let m = unit_metrics();
        let layout = layout_lines(&m, &plain("  ab  "), 10.0, 0, &LayoutConfig::default(), false);
        assert_eq!(line_texts(&layout), vec!["ab"]);
        assert_eq!(layout.lines[0].width, 2.0);
    }

    #[test]
    fn test_space_at_wrap_is_dropped() {
        let m = unit_metrics();
        // "abcd" fills the line; the following space must not start line 2
        let layout = layout_lines(&m, &plain("abcd efg"), 4.0, 0, &LayoutConfig::default(), false);
        assert_eq!(line_texts(&layout), vec!["abcd", "efg"]);
        assert_eq!(layout.lines[1].units[0].kind(), UnitKind::Word);
    }

    #[test]
    fn test_tab_is_never_collapsed() {
        let m = unit_metrics();
        let config = LayoutConfig::default().with_tab_width(2);
        let layout = layout_lines(&m, &plain("\tab"), 10.0, 0, &config, false);
        assert_eq!(layout.lines[0].units[0].kind(), UnitKind::Separator);
        assert_eq!(layout.lines[0].width, 4.0);
    }

    #[test]
    fn test_forced_breaks() {
        let m = unit_metrics();
        let layout = layout_lines(&m, &plain("ab \ncd\n\nef"), 100.0, 0, &LayoutConfig::default(), false);
        assert_eq!(line_texts(&layout), vec!["ab", "cd", "", "ef"]);
        // a blank line still has height
        assert_eq!(layout.lines[2].height, 1.0);
    }

    #[test]
    fn test_trailing_newline_adds_no_line() {
        let m = unit_metrics();
        let layout = layout_lines(&m, &plain("ab\n"), 100.0, 0, &LayoutConfig::default(), false);
        assert_eq!(line_texts(&layout), vec!["ab"]);
        assert!(!layout.is_truncated());
    }

    #[test]
    fn test_max_lines_truncates() {
        let m = unit_metrics();
        let layout = layout_lines(&m, &plain("aaa bbb ccc"), 3.0, 1, &LayoutConfig::default(), false);
        assert_eq!(line_texts(&layout), vec!["aaa"]);
        assert!(layout.is_truncated());
        assert!(layout.consumed < layout.total);

        let unlimited = layout_lines(&m, &plain("aaa bbb ccc"), 3.0, 0, &LayoutConfig::default(), false);
        assert_eq!(unlimited.lines.len(), 3);
        assert_eq!(unlimited.consumed, unlimited.total);
    }

    #[test]
    fn test_max_lines_ignores_leftover_spaces() {
        let m = unit_metrics();
        let config = LayoutConfig::default();
        let limited = layout_lines(&m, &plain("aaa "), 3.0, 1, &config, false);
        let unlimited = layout_lines(&m, &plain("aaa "), 3.0, 0, &config, false);
        assert_eq!(limited.lines, unlimited.lines);
        assert_eq!(limited.consumed, limited.total);
        assert!(!limited.is_truncated());

        // a forced break fills the limit with only spaces after it
        let layout = layout_lines(&m, &plain("ab\n   "), 10.0, 1, &config, false);
        assert_eq!(line_texts(&layout), vec!["ab"]);
        assert!(!layout.is_truncated());
    }

    #[test]
    fn test_max_lines_cut_before_word_after_spaces() {
        let m = unit_metrics();
        let layout = layout_lines(&m, &plain("aaa   bbb"), 3.0, 1, &LayoutConfig::default(), false);
        assert_eq!(line_texts(&layout), vec!["aaa"]);
        assert!(layout.is_truncated());
        // the word is the only unit left
        assert_eq!(layout.total - layout.consumed, 1);
    }

    #[test]
    fn test_max_lines_not_reached() {
        let m = unit_metrics();
        let layout = layout_lines(&m, &plain("aaa bbb"), 100.0, 2, &LayoutConfig::default(), false);
        assert_eq!(layout.lines.len(), 1);
        assert!(!layout.is_truncated());
    }

    #[test]
    fn test_rebreak_reuses_widths() {
        let m = unit_metrics();
        let config = LayoutConfig::default();
        let units = split_units(&m, &plain("one two three"), &config);
        let narrow = break_units(&m, units.clone(), 5.0, 0, &config, None);
        let wide = break_units(&m, units, 100.0, 0, &config, None);
        assert_eq!(narrow.lines.len(), 3);
        assert_eq!(wide.lines.len(), 1);
        assert_eq!(wide.lines[0].width, 13.0);
    }

    #[test]
    fn test_line_width_bound_holds() {
        let m = unit_metrics();
        let text = "the quick brown fox jumps over the extraordinarily lazy dog";
        for width in [3.0, 5.0, 8.0, 13.0, 21.0] {
            let layout = layout_lines(&m, &plain(text), width, 0, &LayoutConfig::default(), false);
            for line in &layout.lines {
                assert!(
                    line.width <= width || line.units.len() == 1,
                    "line {:?} is {} wide at target {}",
                    line.text(),
                    line.width,
                    width
                );
            }
        }
    }

    #[test]
    fn test_text_is_preserved() {
        let m = unit_metrics();
        let text = "lorem ipsum dolor sit amet consectetur";
        let layout = layout_lines(&m, &plain(text), 7.0, 0, &LayoutConfig::default(), false);
        let rejoined = line_texts(&layout).join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let m = unit_metrics();
        let a = layout_lines(&m, &plain("a bb ccc dddd"), 5.0, 0, &LayoutConfig::default(), false);
        let b = layout_lines(&m, &plain("a bb ccc dddd"), 5.0, 0, &LayoutConfig::default(), true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unit_kind_names() {
        assert_eq!(UnitKind::Word.to_string(), "WORD");
        assert_eq!(UnitKind::SeparatorInvisible.to_string(), "SEPARATOR_INVISIBLE");
    }
}
