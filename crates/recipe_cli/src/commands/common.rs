//! Helpers shared by the commands.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use recipe_core::{
    Backend, Config, EditSession, FsStore, GithubStore, RecordStore, SaveKind, SaveOutcome,
    StoreLayout,
};
use std::path::Path;
use std::time::Duration;

/// Session over whichever backend the configuration selects.
pub type Session = EditSession<Box<dyn RecordStore>>;

/// Loads the configuration and opens a fresh session on its store.
pub fn open_session(config_path: &Path) -> Result<Session> {
    let config = load_config(config_path)?;
    let store = open_store(&config).context("Failed to open the recipe store")?;

    Ok(EditSession::new(
        store,
        StoreLayout::from_config(&config.store),
        config.image,
    ))
}

pub fn load_config(config_path: &Path) -> Result<Config> {
    Config::load(config_path).with_context(|| format!("Failed to load {}", config_path.display()))
}

/// Builds the backend the configuration selects.
pub fn open_store(config: &Config) -> recipe_core::Result<Box<dyn RecordStore>> {
    match config.store.backend {
        Backend::Github => {
            let store = GithubStore::from_config(&config.github)?;
            tracing::debug!(repo = %store.repo(), branch = store.branch(), "using GitHub store");
            Ok(Box::new(store))
        }
        Backend::Local => {
            tracing::debug!(path = %config.store.local_path.display(), "using local store");
            Ok(Box::new(FsStore::new(&config.store.local_path)))
        }
    }
}

/// Spinner shown while waiting on the store.
pub fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prints what a save did.
pub fn print_outcome(outcome: &SaveOutcome) {
    match &outcome.kind {
        SaveKind::Created => {
            println!("{} Created {}", style("✓").green(), style(&outcome.path).cyan())
        }
        SaveKind::Updated => {
            println!("{} Updated {}", style("✓").green(), style(&outcome.path).cyan())
        }
        SaveKind::Moved { from } => println!(
            "{} Moved {} {} {}",
            style("✓").green(),
            from,
            style("→").cyan(),
            style(&outcome.path).cyan()
        ),
    }
    println!("  Revision: {}", outcome.revision.short());
    if let Some(image) = &outcome.image_path {
        println!("  Image:    {}", image);
    }
}
