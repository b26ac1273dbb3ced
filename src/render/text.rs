//! Plain text listing of a content sequence.

use std::fmt::Write;

use crate::model::{ContentItem, ContentSequence, Selection};

/// List every item in order: page headers, text blocks verbatim, and one
/// line per image with its toggle label and size.
pub fn to_text(content: &ContentSequence, selection: &Selection) -> String {
    let mut out = String::new();
    let mut current_page = None;

    for (index, item) in content.iter().enumerate() {
        if current_page != Some(item.page()) {
            current_page = Some(item.page());
            let _ = writeln!(out, "=== Page {} ===", item.page());
        }
        match item {
            ContentItem::Text(t) => {
                let text = t.text.trim_end();
                if !text.is_empty() {
                    let _ = writeln!(out, "{}", text);
                }
            }
            ContentItem::Image(i) => {
                let mark = if selection.contains(index) { "x" } else { " " };
                let _ = writeln!(
                    out,
                    "[{}] Include image {} from page {} ({}x{})",
                    mark,
                    index + 1,
                    i.page,
                    i.width(),
                    i.height()
                );
            }
        }
    }

    out
}
