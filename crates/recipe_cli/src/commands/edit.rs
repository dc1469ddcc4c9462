//! Edit a stored recipe.

use super::common::{open_session, print_outcome, spinner};
use super::form::EditArgs;
use anyhow::{Context, Result};
use std::path::Path;

/// Load the recipe, overlay the given flags and save it back.
///
/// Changing the title or category moves the document.
pub fn run(config_path: &Path, category: &str, file: &str, args: EditArgs) -> Result<()> {
    let mut session = open_session(config_path)?;
    let loaded = session.load(category, file)?.clone();

    let mut record = args.form.apply(loaded);
    if args.clear_image {
        record.image_reference.clear();
    }
    let image = args.form.read_image()?;

    let pb = spinner("Sending...");
    let result = session.save(record, image.as_deref());
    pb.finish_and_clear();

    let outcome = result.context("Failed to save recipe")?;
    print_outcome(&outcome);
    Ok(())
}
