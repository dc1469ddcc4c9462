//! Print the Markdown a recipe would be stored as.

use super::form::FormArgs;
use anyhow::{Context, Result};
use console::style;
use recipe_core::{encode, image_timestamp, transform_image, Config, RecipeRecord, StoreLayout};
use std::path::Path;

/// Render the form without touching the store.
pub fn run(config_path: &Path, form: FormArgs) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let layout = StoreLayout::from_config(&config.store);

    let mut record = form.apply(RecipeRecord::default());
    let path = layout.record_path(&record.category, &record.title)?;

    if let Some(bytes) = form.read_image()? {
        let jpeg = transform_image(&bytes, &config.image)?;
        let timestamp = image_timestamp(chrono::Utc::now().timestamp(), config.image.local_time)?;
        record.image_reference = layout.image_reference(&record.category, &timestamp)?;
        eprintln!(
            "{} Image would be stored at {} ({} bytes)",
            style("→").cyan(),
            layout.image_path(&timestamp),
            jpeg.len()
        );
    }

    eprintln!("{} {}", style("→").cyan(), style(&path).cyan());
    print!("{}", encode(&record));
    Ok(())
}
