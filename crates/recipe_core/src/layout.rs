//! Store path layout.
//!
//! Recipes live at `<root>/<category>/<title>.md` and images at
//! `<root>/<images>/<timestamp>.jpg`. This module owns every piece of path
//! arithmetic so the session and the category index agree on it.

use crate::config::StoreConfig;
use crate::error::{RecipeError, Result};

/// File extension of recipe documents.
pub const DOCUMENT_EXT: &str = "md";

/// File extension of image assets.
pub const IMAGE_EXT: &str = "jpg";

/// Characters that are unsafe in a file name on at least one platform.
const UNSAFE_FILENAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Path layout of the records subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    records_root: String,
    images_dir: String,
}

impl StoreLayout {
    /// Creates a layout, trimming surrounding slashes from both components.
    pub fn new(records_root: &str, images_dir: &str) -> Self {
        Self {
            records_root: records_root.trim_matches('/').to_string(),
            images_dir: images_dir.trim_matches('/').to_string(),
        }
    }

    /// Creates a layout from the store configuration.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.records_root, &config.images_dir)
    }

    /// Returns the records root, e.g. "docs".
    pub fn records_root(&self) -> &str {
        &self.records_root
    }

    /// Returns the reserved images directory name, e.g. "images".
    pub fn images_dir(&self) -> &str {
        &self.images_dir
    }

    /// Normalizes a category path.
    ///
    /// Surrounding whitespace and slashes are trimmed and each segment is
    /// trimmed. Empty categories, empty segments, `.`/`..` segments and the
    /// reserved images directory are rejected.
    pub fn normalize_category(&self, category: &str) -> Result<String> {
        let trimmed = category.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(RecipeError::Validation("category is empty".to_string()));
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(RecipeError::Validation(format!(
                    "category '{}' contains an empty segment",
                    category
                )));
            }
            if segment == "." || segment == ".." {
                return Err(RecipeError::Validation(format!(
                    "category '{}' contains a relative segment",
                    category
                )));
            }
            segments.push(segment);
        }

        if segments[0] == self.images_dir {
            return Err(RecipeError::Validation(format!(
                "'{}' is reserved for images",
                self.images_dir
            )));
        }

        Ok(segments.join("/"))
    }

    /// Turns a title into a safe file stem.
    pub fn sanitize_title(&self, title: &str) -> Result<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(RecipeError::Validation("title is empty".to_string()));
        }

        let mut stem: String = title
            .chars()
            .map(|c| {
                if c.is_control() || UNSAFE_FILENAME_CHARS.contains(&c) {
                    '_'
                } else {
                    c
                }
            })
            .collect();

        // Hidden files would vanish from listings
        if stem.starts_with('.') {
            stem.replace_range(..1, "_");
        }

        Ok(stem)
    }

    /// Store path of the document for a category and title.
    pub fn record_path(&self, category: &str, title: &str) -> Result<String> {
        let category = self.normalize_category(category)?;
        let stem = self.sanitize_title(title)?;
        Ok(format!(
            "{}/{}/{}.{}",
            self.records_root, category, stem, DOCUMENT_EXT
        ))
    }

    /// Store path of an existing document given its category and file name.
    ///
    /// The `.md` extension is appended when missing.
    pub fn location(&self, category: &str, filename: &str) -> Result<String> {
        let category = self.normalize_category(category)?;
        let filename = filename.trim();
        if filename.is_empty() || filename.contains('/') || filename.contains('\\') {
            return Err(RecipeError::Validation(format!(
                "invalid file name '{}'",
                filename
            )));
        }

        let suffix = format!(".{}", DOCUMENT_EXT);
        if filename.ends_with(&suffix) {
            Ok(format!("{}/{}/{}", self.records_root, category, filename))
        } else {
            Ok(format!(
                "{}/{}/{}{}",
                self.records_root, category, filename, suffix
            ))
        }
    }

    /// Store path of an image asset with the given timestamp name.
    pub fn image_path(&self, timestamp: &str) -> String {
        format!(
            "{}/{}/{}.{}",
            self.records_root, self.images_dir, timestamp, IMAGE_EXT
        )
    }

    /// Reference to an image asset as seen from a document in `category`.
    ///
    /// The document sits `depth` directories below the records root, so the
    /// reference climbs that many levels before entering the images directory.
    pub fn image_reference(&self, category: &str, timestamp: &str) -> Result<String> {
        let category = self.normalize_category(category)?;
        let depth = category.split('/').count();
        Ok(format!(
            "{}{}/{}.{}",
            "../".repeat(depth),
            self.images_dir,
            timestamp,
            IMAGE_EXT
        ))
    }

    /// Rewrites an image reference written from a document in category
    /// `from` so it resolves to the same asset from category `to`.
    ///
    /// Returns `None` unless the reference resolves to a file directly in the
    /// images directory; other links are left to the caller untouched.
    pub fn rebase_image_reference(&self, reference: &str, from: &str, to: &str) -> Option<String> {
        let mut resolved: Vec<&str> = self.records_root.split('/').collect();
        resolved.extend(from.split('/'));
        for segment in reference.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    resolved.pop()?;
                }
                name => resolved.push(name),
            }
        }

        let asset = resolved.join("/");
        let name = asset.strip_prefix(&format!("{}/{}/", self.records_root, self.images_dir))?;
        if name.is_empty() || name.contains('/') {
            return None;
        }
        let depth = self.normalize_category(to).ok()?.split('/').count();
        Some(format!("{}{}/{}", "../".repeat(depth), self.images_dir, name))
    }

    /// Splits a document path into (category, file name).
    ///
    /// Returns `None` for paths outside the records root or directly in it.
    pub fn split_location<'a>(&self, path: &'a str) -> Option<(&'a str, &'a str)> {
        let rest = self.strip_root(path)?;
        let (category, filename) = rest.rsplit_once('/')?;
        if category.is_empty() || filename.is_empty() {
            return None;
        }
        Some((category, filename))
    }

    /// Strips the records root prefix from a store path.
    pub fn strip_root<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.records_root.as_str())?;
        let rest = rest.strip_prefix('/')?;
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    /// True if a root-relative directory path is the images directory, lives
    /// under it, or has a dot-prefixed segment.
    pub fn is_hidden_category(&self, relative: &str) -> bool {
        let mut segments = relative.split('/');
        if segments.next().map_or(true, |first| first == self.images_dir) {
            return true;
        }
        relative.split('/').any(|segment| segment.starts_with('.'))
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}
