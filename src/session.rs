//! Review session: one upload, one selection pass, one export.
//!
//! A [`Session`] holds the extracted content and the user's selection
//! between interactions. Its files live in a [`Workspace`] directory, so
//! concurrent sessions only need distinct directories.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::compose::{ComposeOptions, ComposeReport, Composer};
use crate::detect::sniff_bytes;
use crate::error::{Error, Result};
use crate::extract::{extract_file, ExtractOptions, Extraction};
use crate::model::{ContentItem, ContentSequence, Selection};

/// File name offered for the composed document.
pub const DOWNLOAD_FILE_NAME: &str = "extracted_images.pdf";

/// MIME type of the composed document.
pub const DOWNLOAD_MIME_TYPE: &str = "application/pdf";

/// Directory holding a session's input and output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the uploaded document is stored.
    pub fn input_path(&self) -> PathBuf {
        self.root.join("input.pdf")
    }

    /// Where the composed document is written.
    pub fn output_path(&self) -> PathBuf {
        self.root.join("output.pdf")
    }
}

/// A composed document ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub path: PathBuf,
    pub label: String,
    pub file_name: String,
    pub mime_type: String,
    pub report: ComposeReport,
}

/// Inclusion toggle shown next to an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    /// Unique per image index
    pub key: String,
    pub label: String,
    pub checked: bool,
}

/// One row of the review listing.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<'a> {
    Text {
        index: usize,
        page: u32,
        text: &'a str,
    },
    Image {
        index: usize,
        page: u32,
        image: &'a DynamicImage,
        toggle: Toggle,
    },
}

/// Session state between user interactions.
#[derive(Debug)]
pub struct Session {
    workspace: Workspace,
    extract_options: ExtractOptions,
    compose_options: ComposeOptions,
    extraction: Option<Extraction>,
    selection: Selection,
}

impl Session {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            extract_options: ExtractOptions::default(),
            compose_options: ComposeOptions::default(),
            extraction: None,
            selection: Selection::new(),
        }
    }

    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    pub fn with_compose_options(mut self, options: ComposeOptions) -> Self {
        self.compose_options = options;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Store an uploaded document and extract its content.
    ///
    /// The previous content and selection are discarded. Non-PDF bytes are
    /// rejected before anything is written. Extraction problems do not fail
    /// the upload; they are reported in the returned [`Extraction`], whose
    /// (possibly partial) content becomes the session content.
    pub fn upload(&mut self, data: &[u8]) -> Result<&Extraction> {
        sniff_bytes(data)?;
        fs::create_dir_all(self.workspace.root())?;
        let input = self.workspace.input_path();
        fs::write(&input, data)?;

        self.selection.clear();
        let extraction = self
            .extraction
            .insert(extract_file(&input, &self.extract_options));
        Ok(extraction)
    }

    /// Whether a document has been uploaded.
    pub fn has_document(&self) -> bool {
        self.extraction.is_some()
    }

    /// The extracted content, if a document has been uploaded.
    pub fn content(&self) -> Option<&ContentSequence> {
        self.extraction.as_ref().map(|e| &e.content)
    }

    /// Review rows in sequence order. Empty before an upload.
    pub fn entries(&self) -> Vec<Entry<'_>> {
        let Some(content) = self.content() else {
            return Vec::new();
        };
        content
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                ContentItem::Text(t) => Entry::Text {
                    index,
                    page: t.page,
                    text: &t.text,
                },
                ContentItem::Image(i) => Entry::Image {
                    index,
                    page: i.page,
                    image: &i.image,
                    toggle: Toggle {
                        key: format!("image_{}", index),
                        label: format!("Include image {} from page {}", index + 1, i.page),
                        checked: self.selection.contains(index),
                    },
                },
            })
            .collect()
    }

    /// Include or exclude the image at `index`.
    pub fn set_included(&mut self, index: usize, included: bool) -> Result<()> {
        self.content()
            .ok_or(Error::NoDocument)?
            .image_at(index)?;
        self.selection.set(index, included);
        Ok(())
    }

    /// Flip the image at `index`, returning whether it is now included.
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        self.content()
            .ok_or(Error::NoDocument)?
            .image_at(index)?;
        Ok(self.selection.toggle(index))
    }

    /// Currently selected image indices, ascending.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Compose the selected images into the workspace output file.
    pub fn create_pdf(&self) -> Result<Download> {
        let content = self.content().ok_or(Error::NoDocument)?;
        let path = self.workspace.output_path();
        let report = Composer::new(self.compose_options.clone()).compose(
            content,
            &self.selection,
            &path,
        )?;

        Ok(Download {
            path,
            label: "Download PDF".to_string(),
            file_name: DOWNLOAD_FILE_NAME.to_string(),
            mime_type: DOWNLOAD_MIME_TYPE.to_string(),
            report,
        })
    }
}
