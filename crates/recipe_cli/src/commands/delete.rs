//! Delete a stored recipe.

use super::common::{open_session, spinner};
use anyhow::Result;
use console::style;
use recipe_core::RecipeError;
use std::io::{self, Write};
use std::path::Path;

pub fn run(config_path: &Path, category: &str, file: &str, yes: bool) -> Result<()> {
    let mut session = open_session(config_path)?;
    let title = session.load(category, file)?.title.clone();

    let confirmed = yes || {
        print!("Delete '{}'? This cannot be undone. [y/N]: ", title);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        input.trim().eq_ignore_ascii_case("y")
    };

    let pb = spinner("Deleting...");
    let result = session.delete_current(confirmed);
    pb.finish_and_clear();

    match result {
        Ok(path) => {
            println!("{} Deleted {}", style("✓").green(), style(path).cyan());
            Ok(())
        }
        Err(RecipeError::NotConfirmed(_)) => {
            println!("{} Deletion cancelled.", style("✓").green());
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("Failed to delete recipe")),
    }
}
