use anyhow::Result;

use pantry_core::models::Ingredient;
use pantry_core::{Error, PantryService};

use super::helpers::{exit_not_found, parse_on_off, print_ingredient_table};

pub(crate) fn cmd_ingredient_add(svc: &PantryService, name: &str, json: bool) -> Result<()> {
    let ingredient = svc.ingredients().add(name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ingredient)?);
    } else {
        let id = ingredient.id;
        println!("Added: {} (id: {id}, on hand)", ingredient.name);
    }
    Ok(())
}

pub(crate) fn cmd_ingredient_list(svc: &PantryService, on_hand: bool, json: bool) -> Result<()> {
    let ingredients = if on_hand {
        svc.ingredients().list_on_hand()?
    } else {
        svc.ingredients().list_all()?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&ingredients)?);
        return Ok(());
    }

    if ingredients.is_empty() {
        if on_hand {
            println!("Nothing on hand. Mark ingredients with: pantry ingredient set <id> on");
        } else {
            println!("Pantry is empty. Add one with: pantry ingredient add <name>");
        }
        return Ok(());
    }

    print_ingredient_table(&ingredients);
    Ok(())
}

pub(crate) fn cmd_ingredient_delete(svc: &PantryService, id: i64, json: bool) -> Result<()> {
    if svc.ingredients().delete(id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": id }));
        } else {
            println!("Deleted ingredient {id}");
        }
        Ok(())
    } else {
        exit_not_found(&format!("Ingredient {id} not found"), json)
    }
}

pub(crate) fn cmd_ingredient_toggle(svc: &PantryService, id: i64, json: bool) -> Result<()> {
    match svc.ingredients().toggle(id) {
        Ok(ingredient) => print_on_hand_change(&ingredient, json),
        Err(e @ Error::NotFound { .. }) => exit_not_found(&e.to_string(), json),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn cmd_ingredient_set(
    svc: &PantryService,
    id: i64,
    state: &str,
    json: bool,
) -> Result<()> {
    let on_hand = parse_on_off(state)?;
    match svc.ingredients().set_on_hand(id, on_hand) {
        Ok(ingredient) => print_on_hand_change(&ingredient, json),
        Err(e @ Error::NotFound { .. }) => exit_not_found(&e.to_string(), json),
        Err(e) => Err(e.into()),
    }
}

fn print_on_hand_change(ingredient: &Ingredient, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(ingredient)?);
    } else {
        let state = if ingredient.on_hand { "on hand" } else { "not on hand" };
        println!("{} is now {state}", ingredient.name);
    }
    Ok(())
}
