//! List recipe categories.

use super::common::{load_config, open_store};
use anyhow::Result;
use console::style;
use recipe_core::{list_categories, Config, StoreLayout};
use std::path::Path;
use tracing::warn;

pub fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let layout = StoreLayout::from_config(&config.store);
    let categories = collect(&config, &layout)?;

    if categories.is_empty() {
        println!(
            "{} No categories found under {}/",
            style("⚠").yellow(),
            layout.records_root()
        );
        return Ok(());
    }

    for category in &categories {
        println!("{}", category);
    }
    Ok(())
}

/// An unreachable or unconfigured store lists as empty.
fn collect(config: &Config, layout: &StoreLayout) -> Result<Vec<String>> {
    match open_store(config) {
        Ok(store) => Ok(list_categories(store.as_ref(), layout)),
        Err(e) if e.is_store_unavailable() => {
            warn!(error = %e, "store unavailable, listing no categories");
            Ok(Vec::new())
        }
        Err(e) => Err(anyhow::Error::new(e).context("Failed to open the recipe store")),
    }
}
