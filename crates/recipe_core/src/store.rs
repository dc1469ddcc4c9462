//! Record store adapter: the boundary to the content store.

use crate::error::{RecipeError, Result};
use crate::types::{Revision, StoredObject, TreeEntry};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the lock file held during local mutations.
const LOCK_FILE: &str = ".recipes.lock";

/// Suffix of in-flight atomic writes.
const TMP_SUFFIX: &str = ".tmp";

/// A content store with revision-checked writes.
///
/// Paths are slash-delimited and relative to the store root. Every mutation
/// carries a commit message; stores without history may only log it.
pub trait RecordStore {
    /// Reads an object and its current revision.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing exists at `path`.
    fn read(&self, path: &str) -> Result<StoredObject>;

    /// Creates a new object and returns its revision.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if `path` is occupied.
    fn create(&self, path: &str, content: &[u8], message: &str) -> Result<Revision>;

    /// Replaces an object whose revision is still `expected`.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` if the revision is stale and `NotFound` if
    /// the object vanished.
    fn update(
        &self,
        path: &str,
        content: &[u8],
        expected: &Revision,
        message: &str,
    ) -> Result<Revision>;

    /// Deletes an object whose revision is still `expected`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RecordStore::update`].
    fn delete(&self, path: &str, expected: &Revision, message: &str) -> Result<()>;

    /// Lists every file and directory below `root`, recursively.
    fn list_tree(&self, root: &str) -> Result<Vec<TreeEntry>>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn read(&self, path: &str) -> Result<StoredObject> {
        (**self).read(path)
    }

    fn create(&self, path: &str, content: &[u8], message: &str) -> Result<Revision> {
        (**self).create(path, content, message)
    }

    fn update(
        &self,
        path: &str,
        content: &[u8],
        expected: &Revision,
        message: &str,
    ) -> Result<Revision> {
        (**self).update(path, content, expected, message)
    }

    fn delete(&self, path: &str, expected: &Revision, message: &str) -> Result<()> {
        (**self).delete(path, expected, message)
    }

    fn list_tree(&self, root: &str) -> Result<Vec<TreeEntry>> {
        (**self).list_tree(root)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn read(&self, path: &str) -> Result<StoredObject> {
        (**self).read(path)
    }

    fn create(&self, path: &str, content: &[u8], message: &str) -> Result<Revision> {
        (**self).create(path, content, message)
    }

    fn update(
        &self,
        path: &str,
        content: &[u8],
        expected: &Revision,
        message: &str,
    ) -> Result<Revision> {
        (**self).update(path, content, expected, message)
    }

    fn delete(&self, path: &str, expected: &Revision, message: &str) -> Result<()> {
        (**self).delete(path, expected, message)
    }

    fn list_tree(&self, root: &str) -> Result<Vec<TreeEntry>> {
        (**self).list_tree(root)
    }
}

/// Computes the revision token the local store assigns to content.
pub fn content_revision(content: &[u8]) -> Revision {
    Revision::new(hex::encode(blake3::hash(content).as_bytes()))
}

/// Local directory store, e.g. a Git working copy.
///
/// Revisions are BLAKE3 hashes of the file content, so any edit made outside
/// this process also invalidates outstanding tokens. Mutations hold an
/// exclusive lock on `.recipes.lock` so the revision check and the write
/// cannot interleave with another process.
///
/// # Examples
///
/// ```
/// use recipe_core::{FsStore, RecordStore};
/// use tempfile::TempDir;
///
/// let tmp = TempDir::new().unwrap();
/// let store = FsStore::new(tmp.path());
///
/// let rev = store.create("docs/main/Curry.md", b"# Curry\n", "Add recipe: Curry").unwrap();
/// let object = store.read("docs/main/Curry.md").unwrap();
/// assert_eq!(object.revision, rev);
/// ```
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory is created on the first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a store path to a filesystem path, rejecting anything that could
    /// escape the root.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        if path.is_empty() || path.starts_with('/') {
            return Err(RecipeError::Validation(format!(
                "invalid store path '{}'",
                path
            )));
        }

        let mut full = self.root.clone();
        for segment in path.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(RecipeError::Validation(format!(
                    "invalid store path '{}'",
                    path
                )));
            }
            full.push(segment);
        }
        Ok(full)
    }

    /// Acquires the store-wide mutation lock.
    fn lock(&self) -> Result<StoreLock> {
        fs::create_dir_all(&self.root)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.root.join(LOCK_FILE))?;
        file.lock_exclusive()?;
        Ok(StoreLock { file })
    }

    /// Reads the current revision of an existing file.
    fn current_revision(&self, path: &str, full: &Path) -> Result<Revision> {
        if !full.is_file() {
            return Err(RecipeError::NotFound(path.to_string()));
        }
        Ok(content_revision(&fs::read(full)?))
    }

    /// Removes directories left empty by a delete, up to the store root.
    fn prune_empty_parents(&self, full: &Path) {
        let mut dir = full.parent();
        while let Some(current) = dir {
            if current == self.root.as_path() {
                break;
            }
            // Fails on non-empty directories
            if fs::remove_dir(current).is_err() {
                break;
            }
            dir = current.parent();
        }
    }

    /// Recursively collects entries below `current`.
    fn collect_entries(
        &self,
        current: &Path,
        prefix: &str,
        out: &mut Vec<TreeEntry>,
    ) -> Result<()> {
        for entry in fs::read_dir(current)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name == LOCK_FILE || name.ends_with(TMP_SUFFIX) {
                continue;
            }

            let path = format!("{}/{}", prefix, name);
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                out.push(TreeEntry::tree(path.clone()));
                self.collect_entries(&entry.path(), &path, out)?;
            } else if file_type.is_file() {
                out.push(TreeEntry::blob(path));
            }
        }
        Ok(())
    }
}

impl RecordStore for FsStore {
    fn read(&self, path: &str) -> Result<StoredObject> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(RecipeError::NotFound(path.to_string()));
        }
        let content = fs::read(&full)?;
        let revision = content_revision(&content);
        debug!(path, revision = revision.short(), "read");
        Ok(StoredObject { content, revision })
    }

    fn create(&self, path: &str, content: &[u8], message: &str) -> Result<Revision> {
        let full = self.resolve(path)?;
        let _lock = self.lock()?;

        if full.exists() {
            return Err(RecipeError::AlreadyExists(path.to_string()));
        }

        atomic_write(&full, content)?;
        let revision = content_revision(content);
        debug!(path, message, revision = revision.short(), "created");
        Ok(revision)
    }

    fn update(
        &self,
        path: &str,
        content: &[u8],
        expected: &Revision,
        message: &str,
    ) -> Result<Revision> {
        let full = self.resolve(path)?;
        let _lock = self.lock()?;

        if self.current_revision(path, &full)? != *expected {
            return Err(RecipeError::PreconditionFailed {
                path: path.to_string(),
            });
        }

        atomic_write(&full, content)?;
        let revision = content_revision(content);
        debug!(path, message, revision = revision.short(), "updated");
        Ok(revision)
    }

    fn delete(&self, path: &str, expected: &Revision, message: &str) -> Result<()> {
        let full = self.resolve(path)?;
        let _lock = self.lock()?;

        if self.current_revision(path, &full)? != *expected {
            return Err(RecipeError::PreconditionFailed {
                path: path.to_string(),
            });
        }

        fs::remove_file(&full)?;
        self.prune_empty_parents(&full);
        debug!(path, message, "deleted");
        Ok(())
    }

    fn list_tree(&self, root: &str) -> Result<Vec<TreeEntry>> {
        let root = root.trim_matches('/');
        let dir = self.resolve(root)?;
        if !dir.is_dir() {
            return Ok(vec![]);
        }

        let mut entries = Vec::new();
        self.collect_entries(&dir, root, &mut entries)?;
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}

/// Exclusive lock on the store, released on drop.
struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Writes a file atomically.
///
/// Uses temp file + fsync + rename for crash safety.
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(TMP_SUFFIX);
    let tmp_path = path.with_file_name(tmp_name);

    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
    }

    fs::rename(&tmp_path, path)?;

    // fsync parent directory (Unix)
    #[cfg(unix)]
    {
        if let Some(parent) = path.parent() {
            if let Ok(dir_file) = File::open(parent) {
                let _ = dir_file.sync_all();
            }
        }
    }

    Ok(())
}
