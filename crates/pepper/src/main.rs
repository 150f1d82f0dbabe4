// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pepper - a Telegram assistant that tracks fridge contents and suggests
//! recipes.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod doctor;
mod recipes;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pepper_config::PepperConfig;
use pepper_core::PepperError;

/// Pepper - fridge inventory and recipe suggestions over Telegram.
#[derive(Parser, Debug)]
#[command(name = "pepper", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Telegram bot until interrupted.
    Serve,
    /// Check configuration, storage and upstream services.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Manage the recipe index.
    Recipes {
        #[command(subcommand)]
        action: RecipesCommand,
    },
    /// Print the effective configuration with secrets masked.
    Config,
}

#[derive(Subcommand, Debug)]
enum RecipesCommand {
    /// Embed a recipe CSV into the index.
    Import {
        /// Path to the CSV file.
        csv: PathBuf,
        /// Replace recipes that are already indexed.
        #[arg(long)]
        force: bool,
        /// Read at most this many rows.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the number of indexed recipes.
    Count,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match pepper_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            pepper_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        Some(Commands::Recipes { action }) => match action {
            RecipesCommand::Import { csv, force, limit } => {
                recipes::run_import(&config, &csv, force, limit).await
            }
            RecipesCommand::Count => recipes::run_count(&config).await,
        },
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("pepper: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &PepperConfig) -> Result<(), PepperError> {
    let rendered =
        pepper_config::render_toml(config).map_err(|e| PepperError::Config(e.to_string()))?;
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_recipe_import() {
        let cli = Cli::try_parse_from([
            "pepper", "recipes", "import", "recipes.csv", "--force", "--limit", "500",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Recipes {
                action: RecipesCommand::Import { csv, force, limit },
            }) => {
                assert_eq!(csv, PathBuf::from("recipes.csv"));
                assert!(force);
                assert_eq!(limit, Some(500));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn import_requires_a_path() {
        assert!(Cli::try_parse_from(["pepper", "recipes", "import"]).is_err());
    }

    #[test]
    fn parses_doctor_plain() {
        let cli = Cli::try_parse_from(["pepper", "doctor", "--plain"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Doctor { plain: true })));
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["pepper"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn default_config_renders() {
        assert!(print_config(&PepperConfig::default()).is_ok());
    }
}
