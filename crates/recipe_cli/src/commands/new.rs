//! Create a new recipe.

use super::common::{open_session, print_outcome, spinner};
use super::form::FormArgs;
use anyhow::{Context, Result};
use recipe_core::RecipeRecord;
use std::path::Path;

pub fn run(config_path: &Path, form: FormArgs) -> Result<()> {
    let mut session = open_session(config_path)?;
    let record = form.apply(RecipeRecord::default());
    let image = form.read_image()?;

    let pb = spinner("Sending...");
    let result = session.save(record, image.as_deref());
    pb.finish_and_clear();

    let outcome = result.context("Failed to save recipe")?;
    print_outcome(&outcome);
    Ok(())
}
