//! Composition options and page geometry.

/// Fixed layout constants of the output document, in points.
///
/// All pages share the same geometry. The defaults reproduce a US Letter
/// page with a 30pt side margin, text starting 40pt below the top edge,
/// 15pt line height and a 50pt bottom threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    /// Horizontal offset of text lines and side margin for images
    pub margin: f32,
    /// Distance from the top edge to the first baseline
    pub top_offset: f32,
    pub line_height: f32,
    /// The text cursor may not go below this
    pub bottom: f32,
    /// Space between the cursor and the top of an image
    pub image_gap: f32,
    pub font_size: f32,
}

impl PageGeometry {
    /// US Letter (8.5 x 11 inches).
    pub fn letter() -> Self {
        Self::with_size(612.0, 792.0)
    }

    /// A4 (210 x 297 mm).
    pub fn a4() -> Self {
        Self::with_size(595.0, 842.0)
    }

    /// Default layout constants on a page of the given size.
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            margin: 30.0,
            top_offset: 40.0,
            line_height: 15.0,
            bottom: 50.0,
            image_gap: 20.0,
            font_size: 12.0,
        }
    }

    /// Where the cursor starts on a fresh page.
    pub fn top(&self) -> f32 {
        self.height - self.top_offset
    }

    /// Widest an image may be placed.
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

/// Options for composing the output document.
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    pub geometry: PageGeometry,

    /// Title written to the document information dictionary
    pub title: Option<String>,
}

impl ComposeOptions {
    /// Create new compose options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_defaults() {
        let g = PageGeometry::default();
        assert_eq!((g.width, g.height), (612.0, 792.0));
        assert_eq!(g.top(), 752.0);
        assert_eq!(g.content_width(), 552.0);
    }

    #[test]
    fn test_compose_options_builder() {
        let options = ComposeOptions::new()
            .with_geometry(PageGeometry::a4())
            .with_title("Picked");
        assert_eq!(options.geometry.width, 595.0);
        assert_eq!(options.title.as_deref(), Some("Picked"));
    }
}
