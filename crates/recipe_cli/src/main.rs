//! Recipe CLI - Command-line interface for the recipe store.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use recipe_core::{RecipeError, CONFIG_FILE};
use std::path::PathBuf;

mod commands;

use commands::form::{EditArgs, FormArgs};

#[derive(Parser)]
#[command(name = "recipe")]
#[command(about = "Manage Markdown recipes in a Git-hosted repository", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// List recipe categories
    Categories,
    /// Create a new recipe
    New {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Show a stored recipe
    Show {
        /// Category path, e.g. main/meat
        category: String,
        /// File name, with or without .md
        file: String,
    },
    /// Edit a stored recipe; unspecified fields keep their values
    Edit {
        /// Category path of the stored recipe
        category: String,
        /// File name, with or without .md
        file: String,
        #[command(flatten)]
        args: EditArgs,
    },
    /// Delete a stored recipe
    Delete {
        /// Category path, e.g. main/meat
        category: String,
        /// File name, with or without .md
        file: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the Markdown a recipe would be stored as
    Preview {
        #[command(flatten)]
        form: FormArgs,
    },
}

fn main() {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", style("×").red().bold(), err);
        let suggestion = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<RecipeError>())
            .and_then(RecipeError::recovery_suggestion);
        if let Some(suggestion) = suggestion {
            eprintln!("  {} {}", style("→").cyan(), suggestion);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_path();

    match cli.command {
        Commands::Init { force } => commands::init::run(config, force),
        Commands::Categories => commands::categories::run(config),
        Commands::New { form } => commands::new::run(config, form),
        Commands::Show { category, file } => commands::show::run(config, &category, &file),
        Commands::Edit {
            category,
            file,
            args,
        } => commands::edit::run(config, &category, &file, args),
        Commands::Delete {
            category,
            file,
            yes,
        } => commands::delete::run(config, &category, &file, yes),
        Commands::Preview { form } => commands::preview::run(config, form),
    }
}
