mod commands;
mod config;
mod functions;
mod gemini;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_cook, cmd_ingredient_add, cmd_ingredient_delete, cmd_ingredient_list, cmd_ingredient_set,
    cmd_ingredient_toggle, cmd_recipe_clear, cmd_recipe_delete, cmd_recipe_list, cmd_recipe_show,
    cmd_report,
};
use crate::config::Config;
use pantry_core::PantryService;

#[derive(Parser)]
#[command(
    name = "pantry",
    version,
    about = "Track what's in your pantry and ask Gemini what to cook with it"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage pantry ingredients
    Ingredient {
        #[command(subcommand)]
        command: IngredientCommands,
    },
    /// Generate a recipe from the on-hand ingredients and save it
    Cook {
        /// Optional style, e.g. "spicy vegetarian"
        style: Vec<String>,
        /// Gemini model to use (default: $PANTRY_MODEL or gemini-2.5-flash)
        #[arg(long)]
        model: Option<String>,
        /// Request timeout in seconds (default: $PANTRY_GENERATION_TIMEOUT_SECS or 60)
        #[arg(long)]
        timeout: Option<u64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage saved recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Report a saved recipe as inappropriate
    Report {
        /// Recipe ID
        recipe: i64,
        /// Why the recipe is being reported
        #[arg(short, long)]
        reason: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum IngredientCommands {
    /// Add an ingredient (it starts out on hand)
    Add {
        /// Ingredient name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List ingredients
    List {
        /// Only show ingredients that are on hand
        #[arg(long)]
        on_hand: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an ingredient by ID
    Delete {
        /// Ingredient ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Flip whether an ingredient is on hand
    Toggle {
        /// Ingredient ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark an ingredient as on hand or not
    Set {
        /// Ingredient ID
        id: i64,
        /// "on" or "off"
        state: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// List saved recipes, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe by ID or title
    Show {
        /// Recipe ID or title
        recipe: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recipe by ID
    Delete {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete every saved recipe
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PANTRY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let svc = PantryService::new(&config.db_path)?;
    tracing::debug!(db = %config.db_path.display(), "opened pantry");

    match cli.command {
        Commands::Ingredient { command } => match command {
            IngredientCommands::Add { name, json } => cmd_ingredient_add(&svc, &name, json),
            IngredientCommands::List { on_hand, json } => cmd_ingredient_list(&svc, on_hand, json),
            IngredientCommands::Delete { id, json } => cmd_ingredient_delete(&svc, id, json),
            IngredientCommands::Toggle { id, json } => cmd_ingredient_toggle(&svc, id, json),
            IngredientCommands::Set { id, state, json } => {
                cmd_ingredient_set(&svc, id, &state, json)
            }
        },
        Commands::Cook {
            style,
            model,
            timeout,
            json,
        } => cmd_cook(&svc, &config, &style, model, timeout, json).await,
        Commands::Recipe { command } => match command {
            RecipeCommands::List { json } => cmd_recipe_list(&svc, json),
            RecipeCommands::Show { recipe, json } => cmd_recipe_show(&svc, &recipe, json),
            RecipeCommands::Delete { id, json } => cmd_recipe_delete(&svc, id, json),
            RecipeCommands::Clear { json } => cmd_recipe_clear(&svc, json),
        },
        Commands::Report {
            recipe,
            reason,
            json,
        } => cmd_report(&svc, &config, recipe, reason.as_deref(), json).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cook_collects_style_words() {
        let cli = Cli::try_parse_from(["pantry", "cook", "spicy", "vegetarian", "--timeout", "30"])
            .unwrap();
        match cli.command {
            Commands::Cook { style, timeout, .. } => {
                assert_eq!(style, vec!["spicy", "vegetarian"]);
                assert_eq!(timeout, Some(30));
            }
            _ => panic!("expected cook"),
        }
    }

    #[test]
    fn test_ingredient_set_args() {
        let cli = Cli::try_parse_from(["pantry", "ingredient", "set", "3", "off", "--json"])
            .unwrap();
        match cli.command {
            Commands::Ingredient {
                command: IngredientCommands::Set { id, state, json },
            } => {
                assert_eq!(id, 3);
                assert_eq!(state, "off");
                assert!(json);
            }
            _ => panic!("expected ingredient set"),
        }
    }

    #[test]
    fn test_report_reason_optional() {
        let cli = Cli::try_parse_from(["pantry", "report", "7"]).unwrap();
        match cli.command {
            Commands::Report { recipe, reason, .. } => {
                assert_eq!(recipe, 7);
                assert!(reason.is_none());
            }
            _ => panic!("expected report"),
        }
    }
}
