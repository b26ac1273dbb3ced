//! Extracted content items.

use image::DynamicImage;

/// A page's text after redaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    /// Plain text of the whole page
    pub text: String,

    /// Source page number (1-indexed)
    pub page: u32,
}

/// One embedded image, decoded to a bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageItem {
    /// Decoded bitmap
    pub image: DynamicImage,

    /// Source page number (1-indexed)
    pub page: u32,
}

impl ImageItem {
    /// Pixel width of the bitmap.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Pixel height of the bitmap.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// One unit of extracted content: a page's text or one of its images.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Text(TextItem),
    Image(ImageItem),
}

impl ContentItem {
    /// Create a text item.
    pub fn text(text: impl Into<String>, page: u32) -> Self {
        ContentItem::Text(TextItem {
            text: text.into(),
            page,
        })
    }

    /// Create an image item.
    pub fn image(image: DynamicImage, page: u32) -> Self {
        ContentItem::Image(ImageItem { image, page })
    }

    /// Source page number (1-indexed).
    pub fn page(&self) -> u32 {
        match self {
            ContentItem::Text(t) => t.page,
            ContentItem::Image(i) => i.page,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ContentItem::Text(_))
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentItem::Image(_))
    }

    pub fn as_text(&self) -> Option<&TextItem> {
        match self {
            ContentItem::Text(t) => Some(t),
            ContentItem::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageItem> {
        match self {
            ContentItem::Image(i) => Some(i),
            ContentItem::Text(_) => None,
        }
    }
}

/// The ordered, immutable result of an extraction.
///
/// Items are grouped by page in ascending order; within a page the text
/// comes first, followed by the page's images. An item's position in the
/// sequence is its only identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentSequence {
    items: Vec<ContentItem>,
}

impl ContentSequence {
    /// Wrap items that are already in document order.
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ContentItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[ContentItem] {
        &self.items
    }

    /// Look up an item that must be an image.
    pub fn image_at(&self, index: usize) -> crate::Result<&ImageItem> {
        self.items
            .get(index)
            .ok_or(crate::Error::IndexOutOfRange(index, self.items.len()))?
            .as_image()
            .ok_or(crate::Error::NotAnImage(index))
    }

    /// Indices of all image items, ascending.
    pub fn image_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_image())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn text_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_text()).count()
    }

    pub fn image_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_image()).count()
    }

    /// Number of distinct source pages represented.
    pub fn page_count(&self) -> usize {
        let mut pages: Vec<u32> = self.items.iter().map(ContentItem::page).collect();
        pages.dedup();
        pages.len()
    }
}

impl<'a> IntoIterator for &'a ContentSequence {
    type Item = &'a ContentItem;
    type IntoIter = std::slice::Iter<'a, ContentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
