//! Write a default configuration file.

use anyhow::{bail, Context, Result};
use console::style;
use recipe_core::Config;
use std::path::Path;

/// Write the default configuration to `config_path`.
pub fn run(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let config = Config::default();
    config
        .save(config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!(
        "{} Wrote {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!();
    println!("Next steps:");
    println!(
        "  {} Set {} to your repository (owner/name)",
        style("→").cyan(),
        style("github.repo").bold()
    );
    println!(
        "  {} Export {} with a token that can write contents",
        style("→").cyan(),
        style(&config.github.token_env).bold()
    );
    println!(
        "  {} Or set {} to work on a local checkout",
        style("→").cyan(),
        style("store.backend = \"local\"").bold()
    );

    Ok(())
}
