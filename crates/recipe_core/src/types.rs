//! Core data types: recipe records, revision tokens and tree entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A recipe as the form edits it.
///
/// `category` is not part of the stored document; it is the directory the
/// document lives in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    /// Display heading and file base name.
    pub title: String,
    /// Slash-delimited category path, e.g. "main/meat".
    pub category: String,
    /// Relative reference to the image asset, empty if none.
    pub image_reference: String,
    /// Ingredient lines, rendered as an unordered list.
    pub ingredients: Vec<String>,
    /// Step lines, rendered as a numbered list.
    pub steps: Vec<String>,
    /// Free text, possibly multi-line.
    pub memo: String,
}

impl RecipeRecord {
    /// Creates a record with a title and category and no content.
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    /// Returns the record with its category replaced.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Splits a multi-line text area into trimmed, non-blank lines.
    pub fn lines_from_text(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// True if the record has an associated image.
    pub fn has_image(&self) -> bool {
        !self.image_reference.trim().is_empty()
    }
}

/// Opaque revision token for a stored object.
///
/// For the GitHub backend this is the blob SHA; for the local backend it is
/// the BLAKE3 hash of the content. Callers only compare tokens for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Revision(String);

impl Revision {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first 8 characters, for display.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content and revision of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Raw content bytes.
    pub content: Vec<u8>,
    /// Revision token required to update or delete the object.
    pub revision: Revision,
}

/// Type of tree entry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file.
    Blob,
    /// Directory.
    Tree,
}

/// Entry in a store tree listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Full store path, slash-delimited, no leading slash.
    pub path: String,
    /// Type of entry.
    pub kind: EntryKind,
}

impl TreeEntry {
    /// Creates a directory entry.
    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Tree,
        }
    }

    /// Creates a file entry.
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
        }
    }

    /// True for directory entries.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Tree
    }
}
