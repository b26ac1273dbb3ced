//! Builds the output document from a content sequence and a selection.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::Result;
use crate::model::{ContentSequence, Selection};

use super::layout::{fit_image, flow_text, preceding_text, TextMark};
use super::options::ComposeOptions;
use super::writer::{DocumentInfo, PdfCanvas};

/// Summary of a finished composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeReport {
    /// Pages in the output document
    pub pages: usize,
    /// Images placed
    pub images: usize,
    /// Size of the written file in bytes
    pub bytes: usize,
    /// Where the document was written, if it was written to disk
    pub path: Option<PathBuf>,
}

/// Lays out selected images, each preceded by its text block.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    options: ComposeOptions,
}

impl Composer {
    pub fn new(options: ComposeOptions) -> Self {
        Self { options }
    }

    /// Compose and write the document to `out_path`.
    ///
    /// Failures (a non-image index, an unwritable path) are logged and
    /// returned; nothing panics.
    pub fn compose<P: AsRef<Path>>(
        &self,
        content: &ContentSequence,
        selection: &Selection,
        out_path: P,
    ) -> Result<ComposeReport> {
        let out_path = out_path.as_ref();
        let result = self.compose_to_bytes(content, selection).and_then(|(bytes, report)| {
            fs::write(out_path, &bytes)?;
            Ok(ComposeReport {
                path: Some(out_path.to_path_buf()),
                ..report
            })
        });

        match result {
            Ok(report) => {
                log::info!(
                    "Saved PDF: {} ({} pages, {} images)",
                    out_path.display(),
                    report.pages,
                    report.images
                );
                Ok(report)
            }
            Err(e) => {
                log::error!("Error creating PDF {}: {}", out_path.display(), e);
                Err(e)
            }
        }
    }

    /// Compose the document in memory.
    pub fn compose_to_bytes(
        &self,
        content: &ContentSequence,
        selection: &Selection,
    ) -> Result<(Vec<u8>, ComposeReport)> {
        // Reject bad indices before laying out anything.
        for index in selection.iter() {
            content.image_at(index)?;
        }

        let geometry = self.options.geometry;
        let mut canvas = PdfCanvas::new(geometry);
        let mut previous = None;

        for index in selection.iter() {
            let image = content.image_at(index)?;
            let mut cursor = geometry.top();

            let text = preceding_text(content, previous, index);
            if !text.is_empty() {
                for mark in flow_text(text, &geometry, &mut cursor) {
                    match mark {
                        TextMark::Line { text, y } => canvas.draw_string(geometry.margin, y, text),
                        TextMark::PageBreak => canvas.show_page()?,
                    }
                }
            }

            // Text ran down to the threshold: the image gets a page of its own.
            if cursor <= geometry.bottom {
                canvas.show_page()?;
                cursor = geometry.top();
            }

            let placement = fit_image(image.width(), image.height(), &geometry, cursor);
            log::debug!(
                "Placing item {} ({}x{} px) at {:.1}x{:.1} pt",
                index,
                image.width(),
                image.height(),
                placement.width,
                placement.height
            );
            canvas.draw_image(&image.image, placement)?;
            canvas.show_page()?;

            previous = Some(index);
        }

        let info = DocumentInfo {
            title: self.options.title.clone(),
            producer: format!("pdfpick {}", env!("CARGO_PKG_VERSION")),
            created: Some(Utc::now()),
        };
        let pages = canvas.page_count();
        let bytes = canvas.finish(&info)?;

        let report = ComposeReport {
            pages,
            images: selection.len(),
            bytes: bytes.len(),
            path: None,
        };
        Ok((bytes, report))
    }
}

/// Compose `selection` from `content` into a PDF at `out_path`.
pub fn compose<P: AsRef<Path>>(
    content: &ContentSequence,
    selection: &Selection,
    out_path: P,
    options: &ComposeOptions,
) -> Result<ComposeReport> {
    Composer::new(options.clone()).compose(content, selection, out_path)
}
