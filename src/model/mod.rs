//! Data model shared by extraction, selection and composition.
//!
//! An extraction produces a [`ContentSequence`]; a user marks image items in
//! a [`Selection`]; the composer reads both.

mod content;
mod selection;

pub use content::{ContentItem, ContentSequence, ImageItem, TextItem};
pub use selection::Selection;
