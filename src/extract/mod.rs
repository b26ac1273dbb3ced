//! PDF content extraction.

mod decode;
mod extractor;
mod options;
mod redact;
mod source;

pub use decode::{decode_image, ColorSpace, EmbeddedImage, SampleEncoding};
pub use extractor::{extract_bytes, extract_file, Extraction, Extractor, SkippedImage};
pub use options::{ErrorMode, ExtractOptions, PageSelection};
pub use redact::redact_timestamp;
pub use source::{ImageRef, LopdfSource, PageId, PdfSource};
