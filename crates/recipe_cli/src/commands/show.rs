//! Show a stored recipe.

use super::common::open_session;
use anyhow::Result;
use console::style;
use recipe_core::{SessionState, INGREDIENTS_LABEL, MEMO_LABEL, STEPS_LABEL};
use std::path::Path;

pub fn run(config_path: &Path, category: &str, file: &str) -> Result<()> {
    let mut session = open_session(config_path)?;
    let record = session.load(category, file)?.clone();

    if let SessionState::Loaded { location, revision } = session.state() {
        println!(
            "{} ({})",
            style(location).dim(),
            style(revision.short()).dim()
        );
    }
    println!("{}", style(&record.title).bold());
    println!("Category: {}", record.category);
    if record.has_image() {
        println!("Image:    {}", record.image_reference);
    }

    println!();
    println!("{}", style(INGREDIENTS_LABEL).bold());
    for line in &record.ingredients {
        println!("  * {}", line);
    }

    println!();
    println!("{}", style(STEPS_LABEL).bold());
    for (i, line) in record.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, line);
    }

    if !record.memo.is_empty() {
        println!();
        println!("{}", style(MEMO_LABEL).bold());
        for line in record.memo.lines() {
            println!("  {}", line);
        }
    }

    Ok(())
}
