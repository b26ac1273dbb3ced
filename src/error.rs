//! Error types for pdfpick.

use std::io;
use thiserror::Error;

/// Result type alias for pdfpick operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting or composing.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries a version we cannot read.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting text from a page.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// An embedded image could not be decoded into a bitmap.
    #[error("Image decoding error: {0}")]
    ImageDecode(String),

    /// An embedded image uses a filter or color space we do not decode.
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// A bitmap could not be re-encoded for the output document.
    #[error("Image encoding error: {0}")]
    ImageEncode(String),

    /// Error writing the output PDF.
    #[error("PDF writing error: {0}")]
    PdfWrite(String),

    /// Item index is past the end of the content sequence.
    #[error("Item {0} is out of range (content has {1} items)")]
    IndexOutOfRange(usize, usize),

    /// Item index refers to a text block, not an image.
    #[error("Item {0} is not an image")]
    NotAnImage(usize),

    /// No document has been uploaded to the session yet.
    #[error("No document has been uploaded")]
    NoDocument,

    /// Error rendering a listing or summary.
    #[error("Rendering error: {0}")]
    Render(String),

    /// A selection or page range string could not be parsed.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            image::ImageError::Unsupported(e) => Error::UnsupportedImage(e.to_string()),
            _ => Error::ImageDecode(err.to_string()),
        }
    }
}
