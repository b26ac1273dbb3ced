//! Output document composition.
//!
//! For every selected image, in ascending index order, the composer writes
//! the first text block found since the previous selected image, then the
//! image scaled to fit the page, then starts a new page.

mod composer;
mod layout;
mod options;
mod writer;

pub use composer::{compose, ComposeReport, Composer};
pub use layout::{fit_image, flow_text, preceding_text, Placement, TextMark};
pub use options::{ComposeOptions, PageGeometry};
pub use writer::{encode_win_ansi, pdf_date, DocumentInfo, PdfCanvas};
