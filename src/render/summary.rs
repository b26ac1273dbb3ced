//! Serializable overview of a content sequence.

use serde::{Deserialize, Serialize};

use crate::model::{ContentItem, ContentSequence, Selection};

/// Overview of an extraction, without bitmap data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSummary {
    pub pages: usize,
    pub texts: usize,
    pub images: usize,
    pub items: Vec<ItemSummary>,
}

/// One item of the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemSummary {
    Text {
        /// 1-based position in the sequence
        position: usize,
        page: u32,
        text: String,
    },
    Image {
        position: usize,
        page: u32,
        width: u32,
        height: u32,
        selected: bool,
    },
}

impl ContentSummary {
    /// Summarize `content`, marking items present in `selection`.
    pub fn new(content: &ContentSequence, selection: &Selection) -> Self {
        let items = content
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                ContentItem::Text(t) => ItemSummary::Text {
                    position: index + 1,
                    page: t.page,
                    text: t.text.clone(),
                },
                ContentItem::Image(i) => ItemSummary::Image {
                    position: index + 1,
                    page: i.page,
                    width: i.width(),
                    height: i.height(),
                    selected: selection.contains(index),
                },
            })
            .collect();

        Self {
            pages: content.page_count(),
            texts: content.text_count(),
            images: content.image_count(),
            items,
        }
    }
}
