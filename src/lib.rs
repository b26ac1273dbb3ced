//! # pdfpick
//!
//! Pick images out of a PDF and rebuild a smaller PDF around them.
//!
//! The library walks a PDF page by page and produces an ordered sequence of
//! text blocks and images. A caller selects some of the images; the
//! composer then writes a new document where each selected image gets its
//! own page, preceded by the text that came before it in the source.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfpick::{compose, extract_file, ComposeOptions, ExtractOptions, Selection};
//!
//! fn main() -> pdfpick::Result<()> {
//!     // Extract text and images in reading order
//!     let content = extract_file("report.pdf", &ExtractOptions::default()).into_result()?;
//!
//!     // Keep every image
//!     let selection: Selection = content.image_indices().into_iter().collect();
//!
//!     let report = compose(&content, &selection, "picked.pdf", &ComposeOptions::default())?;
//!     println!("{} pages written", report.pages);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Ordered extraction**: one text block per page, then its images
//! - **Timestamp redaction**: page text is cut at the first `DD/MM/YYYY, HH:MM`
//! - **Image decoding**: JPEG, Flate/LZW raw samples, gray, RGB, CMYK, indexed
//! - **Review sessions**: upload, toggle images, create the download

pub mod compose;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod render;
pub mod session;

// Re-export commonly used types
pub use compose::{compose, ComposeOptions, ComposeReport, Composer, PageGeometry};
pub use detect::{is_pdf_bytes, sniff_bytes, sniff_path, PdfHeader};
pub use error::{Error, Result};
pub use extract::{
    extract_bytes, extract_file, ErrorMode, ExtractOptions, Extraction, Extractor, PageSelection,
    SkippedImage,
};
pub use model::{ContentItem, ContentSequence, ImageItem, Selection, TextItem};
pub use render::{ContentSummary, JsonFormat};
pub use session::{Download, Entry, Session, Toggle, Workspace};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
