use anyhow::{Context, Result};
use std::sync::Arc;

use pantry_core::scope::RequestScope;
use pantry_core::{Error, PantryService};

use crate::config::Config;
use crate::gemini::GeminiClient;

use super::helpers::{json_error, print_recipe};
use super::recipe::RecipeView;

/// Generate a recipe from the on-hand ingredients and store it.
///
/// Ctrl-C closes the request scope, so a response that arrives afterwards is dropped
/// instead of stored.
pub(crate) async fn cmd_cook(
    svc: &PantryService,
    config: &Config,
    style: &[String],
    model: Option<String>,
    timeout_secs: Option<u64>,
    json: bool,
) -> Result<()> {
    let settings = config.generation_settings(model, timeout_secs)?;
    let client = GeminiClient::new(&settings)?;
    let generation = svc
        .generation(Arc::new(client))
        .with_model(settings.model.clone());

    let style = style.join(" ");
    let on_hand = svc.ingredients().on_hand_names()?;
    if on_hand.is_empty() && !json {
        eprintln!("Nothing on hand; asking for a recipe without ingredient limits.");
    }
    tracing::info!(model = %settings.model, on_hand = on_hand.len(), "cooking");

    let (scope, guard) = RequestScope::guarded();
    let result = tokio::select! {
        result = svc.generate_recipe(&generation, &style, &scope) => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            Err(Error::Abandoned)
        }
    };
    // Closes the scope; nothing generated for this request can be stored past here.
    drop(guard);

    match result {
        Ok(recipe) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&RecipeView::new(&recipe))?);
            } else {
                print_recipe(&recipe);
                println!("\nSaved as recipe {}", recipe.id);
            }
            Ok(())
        }
        Err(e) if e.is_retryable() => {
            Err(anyhow::Error::new(e).context("No recipe stored; try again"))
        }
        Err(Error::Abandoned) => {
            if json {
                println!("{}", json_error("Cancelled"));
            } else {
                eprintln!("Cancelled; no recipe was stored.");
            }
            std::process::exit(130);
        }
        Err(e) => Err(e.into()),
    }
}
