//! The set of image items chosen for the output document.

use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// Ascending, duplicate-free item indices.
///
/// Iteration always yields indices in increasing order, which the composer
/// relies on when it searches for the text preceding each image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    indices: BTreeSet<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include or exclude an index.
    pub fn set(&mut self, index: usize, included: bool) {
        if included {
            self.indices.insert(index);
        } else {
            self.indices.remove(&index);
        }
    }

    /// Flip an index, returning whether it is now included.
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.indices.remove(&index) {
            false
        } else {
            self.indices.insert(index);
            true
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Parse 1-based item positions such as `"2,4,7-9"` into 0-based indices.
    ///
    /// Positions past `len`, the number of items in the content sequence,
    /// are rejected.
    pub fn parse_positions(s: &str, len: usize) -> Result<Self> {
        let mut selection = Selection::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (start, end) = match part.split_once('-') {
                Some((a, b)) => (parse_position(a)?, parse_position(b)?),
                None => {
                    let p = parse_position(part)?;
                    (p, p)
                }
            };
            if start > end {
                return Err(Error::InvalidSelection(format!("descending range {}", part)));
            }
            if end > len {
                return Err(Error::InvalidSelection(format!(
                    "position {} is past the last item ({})",
                    end, len
                )));
            }
            for position in start..=end {
                selection.set(position - 1, true);
            }
        }
        Ok(selection)
    }
}

fn parse_position(s: &str) -> Result<usize> {
    match s.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(Error::InvalidSelection(format!(
            "'{}' is not a 1-based position",
            s.trim()
        ))),
        Ok(p) => Ok(p),
    }
}

impl FromIterator<usize> for Selection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}
