//! Recipe form flags shared by `new`, `edit` and `preview`.

use anyhow::{Context, Result};
use clap::Args;
use recipe_core::RecipeRecord;
use std::path::PathBuf;

/// Field values for a recipe.
#[derive(Args, Debug, Default)]
pub struct FormArgs {
    /// Recipe title (also the file name)
    #[arg(long)]
    pub title: Option<String>,

    /// Category path, e.g. main/meat
    #[arg(long)]
    pub category: Option<String>,

    /// Ingredient line (repeatable)
    #[arg(short = 'i', long = "ingredient")]
    pub ingredients: Vec<String>,

    /// Step line (repeatable, numbered in order)
    #[arg(short = 's', long = "step")]
    pub steps: Vec<String>,

    /// Free-form memo; newlines become line breaks
    #[arg(long)]
    pub memo: Option<String>,

    /// Image file to attach (any common raster format)
    #[arg(long)]
    pub image: Option<PathBuf>,
}

/// Flags of `edit`.
#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub form: FormArgs,

    /// Remove the image reference from the recipe
    #[arg(long, conflicts_with = "image")]
    pub clear_image: bool,
}

impl FormArgs {
    /// Overlays the given flags onto `base`.
    ///
    /// Repeatable flags replace the whole list when given at least once. A
    /// value may hold several lines, as pasted from a text area.
    pub fn apply(&self, mut base: RecipeRecord) -> RecipeRecord {
        if let Some(title) = &self.title {
            base.title = title.clone();
        }
        if let Some(category) = &self.category {
            base.category = category.clone();
        }
        if !self.ingredients.is_empty() {
            base.ingredients = split_lines(&self.ingredients);
        }
        if !self.steps.is_empty() {
            base.steps = split_lines(&self.steps);
        }
        if let Some(memo) = &self.memo {
            base.memo = memo.clone();
        }
        base
    }

    /// Reads the image file, if one was given.
    pub fn read_image(&self) -> Result<Option<Vec<u8>>> {
        match &self.image {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read image {}", path.display()))?;
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }
}

fn split_lines(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| RecipeRecord::lines_from_text(value))
        .collect()
}
