//! PDF header sniffing.
//!
//! Uploads arrive as raw bytes, so the header is checked before anything is
//! written to the workspace or handed to the parser.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The `%PDF-x.y` header of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// Declared version, e.g. "1.7".
    pub version: String,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const MAGIC: &[u8] = b"%PDF-";

/// Bytes of leading junk tolerated before the magic, as most readers do.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Read the header of a PDF file on disk.
pub fn sniff_path<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let mut head = Vec::with_capacity(HEADER_SEARCH_WINDOW);
    File::open(path)?
        .take(HEADER_SEARCH_WINDOW as u64)
        .read_to_end(&mut head)?;
    sniff_bytes(&head)
}

/// Read the header from the start of an in-memory document.
///
/// Returns [`Error::UnknownFormat`] when no `%PDF-` marker is found near the
/// start and [`Error::UnsupportedVersion`] when the version is malformed.
pub fn sniff_bytes(data: &[u8]) -> Result<PdfHeader> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    let start = window
        .windows(MAGIC.len())
        .position(|w| w == MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let rest = &window[start + MAGIC.len()..];
    let version: String = rest
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|&b| b as char)
        .collect();

    if version.is_empty() {
        return Err(Error::UnknownFormat);
    }
    if !is_known_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version })
}

/// Check whether bytes look like a PDF.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    sniff_bytes(data).is_ok()
}

fn is_known_version(version: &str) -> bool {
    match version.split_once('.') {
        Some((major, minor)) => {
            matches!(major, "1" | "2") && minor.len() == 1 && minor.as_bytes()[0].is_ascii_digit()
        }
        None => false,
    }
}
