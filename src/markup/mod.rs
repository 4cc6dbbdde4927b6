//! # Style Markup Parser
//!
//! Turns tagged text such as `<header>Title</header> and <b>bold</b> words`
//! into styled fragments.
//!
//! - A tag named after a registered style switches to that style until it
//!   closes. Tags nest; closing restores the enclosing style.
//! - `<style font=".." size=".." color="#rrggbb">` overrides fields of the
//!   current style inline.
//! - `<br/>` inserts a newline.
//!
//! Nothing here is fatal. Unknown tags are kept as literal text, and when
//! the markup stops parsing the rest of the input is kept literally too.

use crate::style::{Color, Style, StyleRegistry};
use crate::text::StyledFragment;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

struct FragmentBuilder {
    fragments: Vec<StyledFragment>,
}

impl FragmentBuilder {
    /// Append text, merging with the previous fragment when styles match.
    fn push(&mut self, text: &str, style: &Style) {
        if text.is_empty() {
            return;
        }
        match self.fragments.last_mut() {
            Some(last) if last.style == *style => last.text.push_str(text),
            _ => self.fragments.push(StyledFragment::new(text, style.clone())),
        }
    }
}

fn tag_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

fn get_attr(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.as_ref() == name.as_bytes() {
            a.unescape_value().ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}

/// Apply the attributes of an inline `<style>` tag on top of `base`.
fn inline_style(e: &BytesStart, base: &Style) -> Style {
    let mut style = base.clone();
    if let Some(font) = get_attr(e, "font") {
        style.font_id = font;
    }
    if let Some(size) = get_attr(e, "size").and_then(|s| s.trim().parse::<f64>().ok()) {
        style.font_size = size;
    }
    if let Some(color) = get_attr(e, "color") {
        match Color::hex(&color) {
            Some(c) => style.color = c,
            None => log::warn!("ignoring unparseable color '{}'", color),
        }
    }
    if let Some(lh) = get_attr(e, "lineHeight").and_then(|s| s.trim().parse::<f64>().ok()) {
        style.line_height = lh;
    }
    if let Some(ls) = get_attr(e, "letterSpacing").and_then(|s| s.trim().parse::<f64>().ok()) {
        style.letter_spacing = ls;
    }
    style
}

/// Parse markup into fragments. Text outside any style tag uses `default`.
pub fn parse_styled_text(
    styles: &StyleRegistry,
    default: &Style,
    markup: &str,
) -> Vec<StyledFragment> {
    let mut out = FragmentBuilder {
        fragments: Vec::new(),
    };
    // (tag name, style active inside it)
    let mut stack: Vec<(String, Style)> = Vec::new();

    let mut reader = Reader::from_str(markup);
    reader.config_mut().check_end_names = false;
    let mut last_good = 0usize;

    loop {
        let current = stack.last().map(|(_, s)| s).unwrap_or(default).clone();
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = tag_name(&e);
                if let Some(style) = styles.get_style(&name) {
                    stack.push((name, style.clone()));
                } else if name == "style" {
                    stack.push((name, inline_style(&e, &current)));
                } else if name == "br" {
                    out.push("\n", &current);
                } else {
                    out.push(&format!("<{}>", String::from_utf8_lossy(&e)), &current);
                }
            }
            Ok(Event::Empty(e)) => {
                let name = tag_name(&e);
                if name == "br" {
                    out.push("\n", &current);
                } else if !styles.style_exists(&name) && name != "style" {
                    out.push(&format!("<{}/>", String::from_utf8_lossy(&e)), &current);
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if let Some(pos) = stack.iter().rposition(|(tag, _)| *tag == name) {
                    // closing an outer tag also closes anything left open inside it
                    stack.truncate(pos);
                } else if name != "br" {
                    out.push(&format!("</{}>", name), &current);
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(&e).into_owned()));
                out.push(&text, &current);
            }
            Ok(Event::CData(e)) => {
                out.push(&String::from_utf8_lossy(&e), &current);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                log::warn!("malformed markup at byte {}: {}", last_good, err);
                if let Some(rest) = markup.get(last_good..) {
                    out.push(rest, &current);
                }
                break;
            }
        }
        last_good = reader.buffer_position() as usize;
    }

    out.fragments
}
