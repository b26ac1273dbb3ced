//! Listings of extracted content for review: plain text and JSON.

mod json;
mod summary;
mod text;

pub use json::{to_json, JsonFormat};
pub use summary::{ContentSummary, ItemSummary};
pub use text::to_text;
