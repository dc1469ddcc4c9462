//! Edit session: binds a loaded recipe to its store location and revision.
//!
//! The session is an explicit two-state machine:
//!
//! - `Fresh`: nothing bound; a save creates a new document.
//! - `Loaded { location, revision }`: a save updates the bound document in
//!   place, or moves it when the title or category changed; a delete removes
//!   it.
//!
//! Every mutation of a bound document carries the revision token read at
//! load time, so concurrent edits surface as [`RecipeError::Conflict`]
//! instead of silently overwriting each other.

use crate::categories::list_categories;
use crate::codec::{decode, encode};
use crate::config::ImageConfig;
use crate::error::{ConflictKind, RecipeError, Result, SaveStep};
use crate::imaging::{image_timestamp, transform_image};
use crate::layout::StoreLayout;
use crate::store::RecordStore;
use crate::types::{RecipeRecord, Revision};
use crate::TimeProvider;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Binding state of an edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No document bound.
    Fresh,
    /// A document is bound at `location` with the given revision.
    Loaded {
        /// Store path of the bound document.
        location: String,
        /// Revision token of the bound document.
        revision: Revision,
    },
}

/// What a successful save did to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveKind {
    /// A new document was created.
    Created,
    /// The bound document was updated in place.
    Updated,
    /// The document was written to a new location and the old one removed.
    Moved {
        /// Previous store path.
        from: String,
    },
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub kind: SaveKind,
    /// Store path of the written document.
    pub path: String,
    /// Revision of the written document.
    pub revision: Revision,
    /// Store path of the uploaded image, if any.
    pub image_path: Option<String>,
}

/// Interactive editing state over a record store.
pub struct EditSession<S> {
    store: S,
    layout: StoreLayout,
    image_config: ImageConfig,
    state: SessionState,
    draft: RecipeRecord,

    /// Clock for image names (None = system time).
    time_provider: Option<Arc<dyn TimeProvider>>,
}

impl<S: RecordStore> EditSession<S> {
    /// Creates a fresh session over `store`.
    pub fn new(store: S, layout: StoreLayout, image_config: ImageConfig) -> Self {
        Self {
            store,
            layout,
            image_config,
            state: SessionState::Fresh,
            draft: RecipeRecord::default(),
            time_provider: None,
        }
    }

    /// Sets a custom time provider for image names.
    pub fn with_time_provider(
        mut self,
        provider: impl Fn() -> i64 + Send + Sync + 'static,
    ) -> Self {
        self.time_provider = Some(Arc::new(provider));
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The record currently shown in the form.
    pub fn draft(&self) -> &RecipeRecord {
        &self.draft
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Store path of the bound document, if any.
    pub fn location(&self) -> Option<&str> {
        match &self.state {
            SessionState::Fresh => None,
            SessionState::Loaded { location, .. } => Some(location),
        }
    }

    /// Categories available for selection.
    pub fn categories(&self) -> Vec<String> {
        list_categories(&self.store, &self.layout)
    }

    /// Drops any binding and clears the draft.
    pub fn enter_new_mode(&mut self) {
        self.state = SessionState::Fresh;
        self.draft = RecipeRecord::default();
    }

    /// Loads `<root>/<category>/<filename>` into the session.
    ///
    /// `filename` may omit the `.md` extension. On failure the session keeps
    /// its previous state.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed category or file name and `Load`
    /// if the document cannot be read or is not UTF-8.
    pub fn load(&mut self, category: &str, filename: &str) -> Result<&RecipeRecord> {
        let category = self.layout.normalize_category(category)?;
        let location = self.layout.location(&category, filename)?;

        let object = self.store.read(&location).map_err(|e| RecipeError::Load {
            path: location.clone(),
            source: Box::new(e),
        })?;
        let text = String::from_utf8(object.content).map_err(|e| RecipeError::Load {
            path: location.clone(),
            source: Box::new(RecipeError::InvalidResponse(format!(
                "document is not valid UTF-8: {}",
                e
            ))),
        })?;

        info!(path = %location, revision = object.revision.short(), "recipe loaded");
        self.draft = decode(&text).with_category(category);
        self.state = SessionState::Loaded {
            location,
            revision: object.revision,
        };
        Ok(&self.draft)
    }

    /// Saves `record`, optionally attaching a new image.
    ///
    /// The image is normalized and uploaded before the document is written,
    /// and the record's image reference is pointed at it. A failure after
    /// the upload is reported as `SaveIncomplete` naming the uploaded path;
    /// nothing is rolled back. Without a new image, a category change
    /// rewrites an existing link into the images directory so it still
    /// resolves from the new location.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty title or malformed category (no store call)
    /// - `Image` if the image cannot be decoded (no store call)
    /// - `Conflict` if the target is occupied or the bound revision is stale
    /// - `SaveIncomplete` if a later step failed after earlier writes
    pub fn save(&mut self, mut record: RecipeRecord, image: Option<&[u8]>) -> Result<SaveOutcome> {
        let category = self.layout.normalize_category(&record.category)?;
        let target = self.layout.record_path(&category, &record.title)?;
        record.title = record.title.trim().to_string();
        record.category = category.clone();

        let jpeg = match image {
            Some(bytes) => Some(transform_image(bytes, &self.image_config)?),
            None => None,
        };

        let mut written = Vec::new();
        let mut image_path = None;
        if let Some(jpeg) = jpeg {
            // Avoid orphaning an image on a save that cannot succeed
            if self.location() != Some(target.as_str()) {
                self.ensure_vacant(&target)?;
            }

            let timestamp = image_timestamp(self.now(), self.image_config.local_time)?;
            let path = self.layout.image_path(&timestamp);
            record.image_reference = self.layout.image_reference(&category, &timestamp)?;
            self.store
                .create(&path, &jpeg, &format!("Add image for {}", record.title))?;
            info!(path = %path, bytes = jpeg.len(), "image uploaded");
            written.push(path.clone());
            image_path = Some(path);
        } else if !record.image_reference.is_empty() {
            // Links are relative to the document's directory
            let from = self
                .location()
                .and_then(|location| self.layout.split_location(location))
                .map(|(from, _)| from);
            if let Some(from) = from.filter(|from| *from != category) {
                if let Some(rebased) =
                    self.layout
                        .rebase_image_reference(&record.image_reference, from, &category)
                {
                    debug!(from = %record.image_reference, to = %rebased, "image reference rebased");
                    record.image_reference = rebased;
                }
            }
        }

        let content = encode(&record);
        let result = match self.state.clone() {
            SessionState::Fresh => self.create_document(&target, &content, &record),
            SessionState::Loaded { location, revision } if location == target => {
                self.update_document(&target, &content, &revision, &record)
            }
            SessionState::Loaded { location, revision } => {
                self.move_document(&location, &revision, &target, &content, &record, &mut written)
            }
        };

        let (kind, revision) = match result {
            Ok(done) => done,
            Err(e @ RecipeError::SaveIncomplete { .. }) => {
                warn!(path = %target, error = %e, "save incomplete");
                return Err(e);
            }
            Err(e) if !written.is_empty() => {
                warn!(path = %target, written = ?written, error = %e, "save incomplete");
                return Err(RecipeError::SaveIncomplete {
                    step: SaveStep::DocumentWrite,
                    written,
                    source: Box::new(e),
                });
            }
            Err(e) => return Err(e),
        };

        Ok(SaveOutcome {
            kind,
            path: target,
            revision,
            image_path,
        })
    }

    /// Deletes the bound document and returns to `Fresh`.
    ///
    /// # Errors
    ///
    /// Returns `NothingLoaded` without a bound document, `NotConfirmed` when
    /// `confirmed` is false (no store call), and `Conflict` if the document
    /// changed since it was loaded.
    pub fn delete_current(&mut self, confirmed: bool) -> Result<String> {
        let (location, revision) = match &self.state {
            SessionState::Fresh => return Err(RecipeError::NothingLoaded),
            SessionState::Loaded { location, revision } => (location.clone(), revision.clone()),
        };
        if !confirmed {
            return Err(RecipeError::NotConfirmed(location));
        }

        let message = format!("Delete recipe: {}", self.draft.title);
        self.store
            .delete(&location, &revision, &message)
            .map_err(|e| stale_as_conflict(e, &location))?;

        info!(path = %location, "recipe deleted");
        self.enter_new_mode();
        Ok(location)
    }

    fn create_document(
        &mut self,
        target: &str,
        content: &str,
        record: &RecipeRecord,
    ) -> Result<(SaveKind, Revision)> {
        let message = format!("Add recipe: {}", record.title);
        let revision = self
            .store
            .create(target, content.as_bytes(), &message)
            .map_err(|e| occupied_as_conflict(e, target))?;

        info!(path = %target, revision = revision.short(), "recipe created");
        // Ready for the next recipe
        self.draft = RecipeRecord::default();
        Ok((SaveKind::Created, revision))
    }

    fn update_document(
        &mut self,
        target: &str,
        content: &str,
        expected: &Revision,
        record: &RecipeRecord,
    ) -> Result<(SaveKind, Revision)> {
        let message = format!("Update recipe: {}", record.title);
        let revision = self
            .store
            .update(target, content.as_bytes(), expected, &message)
            .map_err(|e| stale_as_conflict(e, target))?;

        info!(path = %target, revision = revision.short(), "recipe updated");
        self.bind(target, revision.clone(), record);
        Ok((SaveKind::Updated, revision))
    }

    fn move_document(
        &mut self,
        from: &str,
        expected: &Revision,
        target: &str,
        content: &str,
        record: &RecipeRecord,
        written: &mut Vec<String>,
    ) -> Result<(SaveKind, Revision)> {
        let message = format!("Move recipe: {} -> {}", from, target);
        let revision = self
            .store
            .create(target, content.as_bytes(), &message)
            .map_err(|e| occupied_as_conflict(e, target))?;
        written.push(target.to_string());

        // The new copy is the live record from here on
        self.bind(target, revision.clone(), record);

        if let Err(e) = self.store.delete(from, expected, &message) {
            return Err(RecipeError::SaveIncomplete {
                step: SaveStep::OldDocumentDelete,
                written: std::mem::take(written),
                source: Box::new(stale_as_conflict(e, from)),
            });
        }

        info!(from = %from, to = %target, revision = revision.short(), "recipe moved");
        Ok((
            SaveKind::Moved {
                from: from.to_string(),
            },
            revision,
        ))
    }

    fn bind(&mut self, location: &str, revision: Revision, record: &RecipeRecord) {
        self.state = SessionState::Loaded {
            location: location.to_string(),
            revision,
        };
        self.draft = record.clone();
    }

    fn ensure_vacant(&self, path: &str) -> Result<()> {
        match self.store.read(path) {
            Ok(_) => Err(RecipeError::Conflict {
                path: path.to_string(),
                kind: ConflictKind::Occupied,
            }),
            Err(RecipeError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn now(&self) -> i64 {
        match &self.time_provider {
            Some(provider) => provider.now(),
            None => chrono::Utc::now().timestamp(),
        }
    }
}

fn occupied_as_conflict(err: RecipeError, path: &str) -> RecipeError {
    match err {
        RecipeError::AlreadyExists(_) => RecipeError::Conflict {
            path: path.to_string(),
            kind: ConflictKind::Occupied,
        },
        other => other,
    }
}

/// A stale token or a vanished document both mean someone else changed it.
fn stale_as_conflict(err: RecipeError, path: &str) -> RecipeError {
    match err {
        RecipeError::PreconditionFailed { .. } | RecipeError::NotFound(_) => {
            RecipeError::Conflict {
                path: path.to_string(),
                kind: ConflictKind::StaleRevision,
            }
        }
        other => other,
    }
}

// Manual Debug implementation to skip store and time_provider
impl<S> std::fmt::Debug for EditSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("state", &self.state)
            .field("draft", &self.draft)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
