//! Walks a PDF page by page and builds the content sequence.

use std::path::Path;

use crate::detect::sniff_path;
use crate::error::{Error, Result};
use crate::model::{ContentItem, ContentSequence};

use super::decode::decode_image;
use super::options::{ErrorMode, ExtractOptions};
use super::redact::redact_timestamp;
use super::source::{ImageRef, LopdfSource, PdfSource};

/// An image that was left out of the content sequence.
#[derive(Debug)]
pub struct SkippedImage {
    /// Page the image is drawn on
    pub page: u32,
    /// Object reference of the XObject (e.g. "12 0 R")
    pub object: String,
    /// Why it was skipped
    pub error: Error,
}

/// Outcome of an extraction.
///
/// Extraction never panics and never discards what it already read: when a
/// failure stops the walk early, `content` holds everything gathered before
/// it and `error` says what went wrong.
#[derive(Debug, Default)]
pub struct Extraction {
    pub content: ContentSequence,
    /// Images skipped in lenient mode
    pub skipped: Vec<SkippedImage>,
    /// The failure that stopped extraction, if any
    pub error: Option<Error>,
}

impl Extraction {
    /// An extraction that failed before reading any page.
    pub fn failed(error: Error) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// True when every selected page and image was read.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.skipped.is_empty()
    }

    /// Convert to a `Result`, dropping partial content on failure.
    pub fn into_result(self) -> Result<ContentSequence> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.content),
        }
    }
}

/// Extract the content of a PDF file.
///
/// Failures are logged and reported in the returned [`Extraction`].
pub fn extract_file<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Extraction {
    let path = path.as_ref();
    match Extractor::open_with_options(path, options.clone()) {
        Ok(extractor) => extractor.extract(),
        Err(e) => {
            log::error!("Error extracting content from {}: {}", path.display(), e);
            Extraction::failed(e)
        }
    }
}

/// Extract the content of an in-memory PDF.
pub fn extract_bytes(data: &[u8], options: &ExtractOptions) -> Extraction {
    match Extractor::from_bytes_with_options(data, options.clone()) {
        Ok(extractor) => extractor.extract(),
        Err(e) => {
            log::error!("Error extracting content: {}", e);
            Extraction::failed(e)
        }
    }
}

/// Page-ordered content extractor.
pub struct Extractor<S = LopdfSource> {
    source: S,
    options: ExtractOptions,
}

impl Extractor<LopdfSource> {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ExtractOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let path = path.as_ref();
        sniff_path(path)?;
        let source = LopdfSource::load_file(path)?;
        log::info!("Opened PDF: {} (PDF {})", path.display(), source.version());
        Ok(Self { source, options })
    }

    /// Open an in-memory PDF with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ExtractOptions) -> Result<Self> {
        crate::detect::sniff_bytes(data)?;
        let source = LopdfSource::load_bytes(data)?;
        log::info!("Opened PDF from memory (PDF {})", source.version());
        Ok(Self { source, options })
    }
}

impl<S: PdfSource> Extractor<S> {
    /// Wrap an arbitrary source.
    pub fn with_source(source: S, options: ExtractOptions) -> Self {
        Self { source, options }
    }

    /// Walk the selected pages in ascending order.
    pub fn extract(&self) -> Extraction {
        let mut items = Vec::new();
        let mut skipped = Vec::new();
        let error = self.walk(&mut items, &mut skipped).err();

        if let Some(ref e) = error {
            log::error!("Error extracting content: {}", e);
        }
        for skip in &skipped {
            log::warn!(
                "Skipped image {} on page {}: {}",
                skip.object,
                skip.page,
                skip.error
            );
        }

        Extraction {
            content: ContentSequence::new(items),
            skipped,
            error,
        }
    }

    fn walk(&self, items: &mut Vec<ContentItem>, skipped: &mut Vec<SkippedImage>) -> Result<()> {
        let lenient = self.options.error_mode == ErrorMode::Lenient;

        for (page_num, page_id) in self.source.pages() {
            if !self.options.pages.includes(page_num) {
                continue;
            }
            log::debug!("Extracting page {}", page_num);

            let text = match self.source.page_text(page_num) {
                Ok(text) => redact_timestamp(&text).to_string(),
                Err(e) if lenient => {
                    log::warn!("Failed to extract text from page {}: {}", page_num, e);
                    String::new()
                }
                Err(e) => return Err(e),
            };
            items.push(ContentItem::text(text, page_num));

            let refs = match self.source.page_images(page_id) {
                Ok(refs) => refs,
                Err(e) if lenient => {
                    log::warn!("Failed to list images on page {}: {}", page_num, e);
                    Vec::new()
                }
                Err(e) => return Err(e),
            };

            for image_ref in refs {
                match self.load(image_ref) {
                    Ok(image) => items.push(ContentItem::image(image, page_num)),
                    Err(error) if lenient => skipped.push(SkippedImage {
                        page: page_num,
                        object: format!("{} {} R", image_ref.id.0, image_ref.id.1),
                        error,
                    }),
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(())
    }

    fn load(&self, image_ref: ImageRef) -> Result<image::DynamicImage> {
        let embedded = self.source.load_image(image_ref)?;
        decode_image(&embedded)
    }
}
