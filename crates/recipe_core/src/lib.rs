//! Recipe Core Library
//!
//! A recipe record store over a Git-hosted content repository, providing:
//! - A Markdown codec for recipe documents
//! - Record stores backed by the GitHub contents API or a local directory
//! - Category listing from the repository tree
//! - An edit session with revision-checked update, move and delete
//!
//! # Quick Start
//!
//! ```
//! use recipe_core::{EditSession, FsStore, ImageConfig, RecipeRecord, StoreLayout};
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let store = FsStore::new(tmp.path());
//! let mut session = EditSession::new(store, StoreLayout::default(), ImageConfig::default());
//!
//! // Create a recipe
//! let mut record = RecipeRecord::new("Curry", "main");
//! record.ingredients = vec!["rice".into()];
//! session.save(record, None).unwrap();
//!
//! // Load it back for editing
//! let draft = session.load("main", "Curry").unwrap();
//! assert_eq!(draft.ingredients, vec!["rice"]);
//! assert_eq!(session.categories(), vec!["main"]);
//! ```
//!
//! # Features
//!
//! ## Optimistic Concurrency
//!
//! Every stored object carries a revision token. Updates and deletes of a
//! loaded recipe present the token read at load time; if someone else
//! changed the document in between, the session reports a conflict and
//! writes nothing:
//!
//! ```
//! use recipe_core::{ConflictKind, EditSession, FsStore, ImageConfig, RecipeError, RecipeRecord,
//!     RecordStore, StoreLayout};
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let store = FsStore::new(tmp.path());
//! store.create("docs/main/Curry.md", b"# Curry\n", "seed").unwrap();
//!
//! let mut session = EditSession::new(&store, StoreLayout::default(), ImageConfig::default());
//! let draft = session.load("main", "Curry").unwrap().clone();
//!
//! // A concurrent writer changes the document
//! let current = store.read("docs/main/Curry.md").unwrap();
//! store.update("docs/main/Curry.md", b"# Curry!\n", &current.revision, "edit").unwrap();
//!
//! let err = session.save(draft, None).unwrap_err();
//! assert!(matches!(err, RecipeError::Conflict { kind: ConflictKind::StaleRevision, .. }));
//! ```

mod categories;
mod codec;
mod config;
mod error;
mod github;
mod imaging;
mod layout;
mod session;
mod store;
mod types;

pub use categories::list_categories;
pub use codec::{decode, encode, INGREDIENTS_LABEL, MEMO_LABEL, STEPS_LABEL};
pub use config::{Backend, Config, GithubConfig, ImageConfig, StoreConfig, CONFIG_FILE};
pub use error::{ConflictKind, RecipeError, Result, SaveStep};
pub use github::GithubStore;
pub use imaging::{image_timestamp, transform_image};
pub use layout::{StoreLayout, DOCUMENT_EXT, IMAGE_EXT};
pub use session::{EditSession, SaveKind, SaveOutcome, SessionState};
pub use store::{content_revision, FsStore, RecordStore};
pub use types::*;

/// Time provider trait for testing.
///
/// Allows injecting a controlled clock into sessions so image names are
/// deterministic. Only used when explicitly set via `with_time_provider()`.
pub trait TimeProvider: Send + Sync {
    /// Returns the current Unix timestamp in seconds.
    fn now(&self) -> i64;
}

impl<F> TimeProvider for F
where
    F: Fn() -> i64 + Send + Sync,
{
    fn now(&self) -> i64 {
        self()
    }
}
