use anyhow::Result;
use serde::Serialize;

use pantry_core::models::{Recipe, RecipeIngredient};
use pantry_core::{Error, PantryService};

use super::helpers::{exit_not_found, print_recipe, print_recipe_table};

/// JSON view of a stored recipe with the ingredient payload decoded.
#[derive(Serialize)]
pub(super) struct RecipeView<'a> {
    #[serde(flatten)]
    pub recipe: &'a Recipe,
    pub ingredient_list: Vec<RecipeIngredient>,
}

impl<'a> RecipeView<'a> {
    pub(super) fn new(recipe: &'a Recipe) -> Self {
        Self {
            recipe,
            ingredient_list: recipe.ingredient_list(),
        }
    }
}

pub(crate) fn cmd_recipe_list(svc: &PantryService, json: bool) -> Result<()> {
    let recipes = svc.recipes().list_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
        return Ok(());
    }

    if recipes.is_empty() {
        println!("No recipes yet. Generate one with: pantry cook");
        return Ok(());
    }

    print_recipe_table(&recipes);
    Ok(())
}

pub(crate) fn cmd_recipe_show(svc: &PantryService, reference: &str, json: bool) -> Result<()> {
    let recipe = match svc.resolve_recipe(reference) {
        Ok(r) => r,
        Err(e @ (Error::NotFound { .. } | Error::Validation(_))) => {
            exit_not_found(&e.to_string(), json)
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&RecipeView::new(&recipe))?);
    } else {
        print_recipe(&recipe);
    }
    Ok(())
}

pub(crate) fn cmd_recipe_delete(svc: &PantryService, id: i64, json: bool) -> Result<()> {
    if svc.recipes().delete(id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": id }));
        } else {
            println!("Deleted recipe {id}");
        }
        Ok(())
    } else {
        exit_not_found(&format!("Recipe {id} not found"), json)
    }
}

pub(crate) fn cmd_recipe_clear(svc: &PantryService, json: bool) -> Result<()> {
    let removed = svc.recipes().clear()?;
    if json {
        println!("{}", serde_json::json!({ "deleted": removed }));
    } else {
        println!("Deleted {removed} recipe(s)");
    }
    Ok(())
}
