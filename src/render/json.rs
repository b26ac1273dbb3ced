//! JSON rendering of content summaries.

use crate::error::{Error, Result};

use super::ContentSummary;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a summary to JSON.
pub fn to_json(summary: &ContentSummary, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(summary),
        JsonFormat::Compact => serde_json::to_string(summary),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentItem, ContentSequence, Selection};
    use image::{DynamicImage, GrayImage};

    fn summary() -> ContentSummary {
        let content = ContentSequence::new(vec![
            ContentItem::text("Hello", 1),
            ContentItem::image(DynamicImage::ImageLuma8(GrayImage::new(6, 4)), 1),
        ]);
        let selection: Selection = [1].into_iter().collect();
        ContentSummary::new(&content, &selection)
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&summary(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"kind\": \"image\""));
        assert!(json.contains("\"selected\": true"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact_round_trip() {
        let json = to_json(&summary(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        let back: ContentSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary());
        assert_eq!((back.texts, back.images, back.pages), (1, 1, 1));
    }
}
