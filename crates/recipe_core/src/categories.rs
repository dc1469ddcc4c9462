//! Category listing.

use crate::layout::StoreLayout;
use crate::store::RecordStore;
use tracing::warn;

/// Lists the categories available in the store.
///
/// Returns every directory below the records root, relative to it, except
/// the images directory and dot-prefixed entries. The result is sorted and
/// free of duplicates. A store that cannot be listed yields an empty list.
pub fn list_categories<S: RecordStore + ?Sized>(store: &S, layout: &StoreLayout) -> Vec<String> {
    let entries = match store.list_tree(layout.records_root()) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "cannot list categories");
            return Vec::new();
        }
    };

    let mut categories: Vec<String> = entries
        .iter()
        .filter(|entry| entry.is_dir())
        .filter_map(|entry| layout.strip_root(&entry.path))
        .filter(|relative| !layout.is_hidden_category(relative))
        .map(str::to_string)
        .collect();

    categories.sort();
    categories.dedup();
    categories
}
