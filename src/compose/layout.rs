//! Pure layout decisions: which text goes before an image, where text lines
//! land, and how large an image is drawn.

use crate::model::ContentSequence;

use super::options::PageGeometry;

/// The text placed before the image at `index`.
///
/// Only the first text item strictly between the previous selected image and
/// `index` is used; further text items in that range are dropped. With no
/// previous image the search starts at the beginning of the sequence.
pub fn preceding_text(content: &ContentSequence, previous: Option<usize>, index: usize) -> &str {
    let start = previous.map_or(0, |p| p + 1);
    let end = index.min(content.len());
    if start >= end {
        return "";
    }
    content.as_slice()[start..end]
        .iter()
        .find_map(|item| item.as_text())
        .map_or("", |t| t.text.as_str())
}

/// One step of laying out a text block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextMark<'a> {
    /// Draw a line with its baseline at `y`
    Line { text: &'a str, y: f32 },
    /// Finish the current page and continue at the top of a new one
    PageBreak,
}

/// Lay out `text` one line per `\n`, starting at `*cursor` and moving down.
///
/// A page break is emitted whenever the cursor has dropped below the bottom
/// threshold before a line is drawn. On return `*cursor` is the baseline the
/// next line would use.
pub fn flow_text<'a>(text: &'a str, geometry: &PageGeometry, cursor: &mut f32) -> Vec<TextMark<'a>> {
    let mut marks = Vec::new();
    for line in text.split('\n') {
        if *cursor < geometry.bottom {
            marks.push(TextMark::PageBreak);
            *cursor = geometry.top();
        }
        marks.push(TextMark::Line { text: line, y: *cursor });
        *cursor -= geometry.line_height;
    }
    marks
}

/// Where and how large an image is drawn, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fit a `pixel_width` x `pixel_height` image below `cursor`.
///
/// The image is scaled to the content width. If it would then reach past the
/// bottom threshold it is shrunk to the remaining space instead. The aspect
/// ratio `height / width` is kept in both cases, and the result is centered
/// horizontally with its top `image_gap` below the cursor. The caller must
/// ensure `cursor` is above the bottom threshold.
pub fn fit_image(pixel_width: u32, pixel_height: u32, geometry: &PageGeometry, cursor: f32) -> Placement {
    let aspect_ratio = pixel_height.max(1) as f32 / pixel_width.max(1) as f32;

    let mut width = geometry.content_width();
    let mut height = width * aspect_ratio;

    let available = cursor - geometry.bottom;
    if height > available {
        height = available;
        width = height / aspect_ratio;
    }

    Placement {
        x: (geometry.width - width) / 2.0,
        y: cursor - height - geometry.image_gap,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentItem;
    use image::{DynamicImage, RgbImage};

    fn img() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(2, 2))
    }

    #[test]
    fn test_preceding_text_per_image() {
        let content = ContentSequence::new(vec![
            ContentItem::text("A", 1),
            ContentItem::image(img(), 1),
            ContentItem::text("B", 2),
            ContentItem::image(img(), 2),
        ]);
        assert_eq!(preceding_text(&content, None, 1), "A");
        assert_eq!(preceding_text(&content, Some(1), 3), "B");
    }

    #[test]
    fn test_preceding_text_takes_first_only() {
        let content = ContentSequence::new(vec![
            ContentItem::text("A", 1),
            ContentItem::text("B", 2),
            ContentItem::image(img(), 2),
        ]);
        assert_eq!(preceding_text(&content, None, 2), "A");
    }

    #[test]
    fn test_preceding_text_none_between_adjacent_images() {
        let content = ContentSequence::new(vec![
            ContentItem::text("A", 1),
            ContentItem::image(img(), 1),
            ContentItem::image(img(), 1),
        ]);
        assert_eq!(preceding_text(&content, Some(1), 2), "");
        assert_eq!(preceding_text(&content, None, 0), "");
    }

    #[test]
    fn test_flow_text_breaks_pages() {
        let geometry = PageGeometry::letter();
        let mut cursor = 60.0;
        let marks = flow_text("one\ntwo\nthree", &geometry, &mut cursor);
        assert_eq!(
            marks,
            vec![
                TextMark::Line { text: "one", y: 60.0 },
                TextMark::PageBreak,
                TextMark::Line { text: "two", y: 752.0 },
                TextMark::Line { text: "three", y: 737.0 },
            ]
        );
        assert_eq!(cursor, 722.0);
    }

    #[test]
    fn test_fit_image_keeps_aspect_ratio() {
        let geometry = PageGeometry::letter();
        for (w, h) in [(800, 600), (100, 1000), (3, 7), (1920, 1080)] {
            let p = fit_image(w, h, &geometry, geometry.top());
            let source = h as f32 / w as f32;
            assert!((p.height / p.width - source).abs() < 1e-4, "{}x{}", w, h);
            assert!(p.width <= geometry.content_width() + 1e-3);
            assert!(p.y >= geometry.bottom - geometry.image_gap - 1e-3);
        }
    }

    #[test]
    fn test_fit_image_shrinks_to_remaining_space() {
        let geometry = PageGeometry::letter();
        let p = fit_image(100, 100, &geometry, 250.0);
        assert_eq!(p.height, 200.0);
        assert_eq!(p.width, 200.0);
        assert_eq!(p.x, 206.0);
        assert_eq!(p.y, 30.0);
    }

    #[test]
    fn test_fit_image_wide_image_uses_content_width() {
        let geometry = PageGeometry::letter();
        let p = fit_image(1104, 276, &geometry, geometry.top());
        assert_eq!(p.width, 552.0);
        assert_eq!(p.height, 138.0);
        assert_eq!(p.x, 30.0);
    }
}
