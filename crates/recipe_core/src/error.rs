//! Error types for recipe_core operations.

use std::fmt;
use thiserror::Error;

/// Core error type for recipe_core operations.
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Read, update or delete target does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Create collided with an existing path.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The revision token supplied with an update or delete is stale.
    #[error("revision mismatch at {path}: the document changed since it was loaded")]
    PreconditionFailed {
        /// Store path of the document
        path: String,
    },

    /// Input rejected before any store call.
    #[error("validation error: {0}")]
    Validation(String),

    /// The store could not be reached (network, timeout).
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// The store is missing configuration or credentials.
    #[error("store not configured: {0}")]
    Unconfigured(String),

    /// A save or delete would clobber data the session does not own.
    #[error("conflict at {path}: {kind}")]
    Conflict {
        /// Store path where the conflict was detected
        path: String,
        /// What kind of conflict occurred
        kind: ConflictKind,
    },

    /// Loading a document into the session failed.
    #[error("failed to load {path}: {source}")]
    Load {
        /// Store path that was being loaded
        path: String,
        /// Underlying failure
        #[source]
        source: Box<RecipeError>,
    },

    /// A multi-step save failed partway; earlier steps were not rolled back.
    #[error("save incomplete: {step} failed after writing [{}]: {source}", .written.join(", "))]
    SaveIncomplete {
        /// The step that failed
        step: SaveStep,
        /// Paths that were already written before the failure
        written: Vec<String>,
        /// Underlying failure
        #[source]
        source: Box<RecipeError>,
    },

    /// The session has no document bound.
    #[error("no recipe loaded")]
    NothingLoaded,

    /// A destructive operation was requested without confirmation.
    #[error("deletion of {0} not confirmed")]
    NotConfirmed(String),

    /// Image decoding or encoding failed.
    #[error("image error: {0}")]
    Image(String),

    /// The remote store answered with an unexpected status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// The remote store answered with a body we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Kind of conflict surfaced by the edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// A document already exists at the target path.
    Occupied,
    /// The bound revision token no longer matches the store.
    StaleRevision,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Occupied => write!(f, "a recipe already exists at this path"),
            Self::StaleRevision => write!(f, "the recipe was changed by someone else"),
        }
    }
}

/// A step of the save sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStep {
    /// Creating or updating the recipe document.
    DocumentWrite,
    /// Deleting the old document after a move.
    OldDocumentDelete,
}

impl fmt::Display for SaveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentWrite => write!(f, "document write"),
            Self::OldDocumentDelete => write!(f, "old document delete"),
        }
    }
}

impl RecipeError {
    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Conflict {
                kind: ConflictKind::Occupied,
                ..
            } => Some("Choose a different title, or use 'recipe edit' to change the existing recipe."),
            Self::Conflict {
                kind: ConflictKind::StaleRevision,
                ..
            }
            | Self::PreconditionFailed { .. } => {
                Some("Reload the recipe with 'recipe show' and apply your changes again.")
            }
            Self::SaveIncomplete {
                step: SaveStep::OldDocumentDelete,
                ..
            } => Some("The recipe now exists at both paths. Delete the old copy with 'recipe delete'."),
            Self::SaveIncomplete { .. } => {
                Some("An uploaded image was left without a recipe. It can be removed manually.")
            }
            Self::Unconfigured(_) => {
                Some("Check [github] in recipes.toml and that the token environment variable is set.")
            }
            Self::Unreachable(_) => Some("Check your network connection and try again."),
            Self::NotConfirmed(_) => Some("Pass --yes to confirm the deletion."),
            Self::ConfigError(_) => Some("Run 'recipe init' to write a default recipes.toml."),
            _ => None,
        }
    }

    /// True for failures that mean the store itself is unusable, as opposed to
    /// a problem with one document.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Unconfigured(_))
    }
}

/// Convenience Result type for recipe_core operations.
pub type Result<T> = std::result::Result<T, RecipeError>;
