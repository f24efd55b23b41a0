use anyhow::{Result, bail};
use serde::Serialize;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use pantry_core::models::{Ingredient, Recipe};

/// Parse an on-hand state given on the command line.
pub(crate) fn parse_on_off(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "on" | "yes" | "true" | "1" | "have" => Ok(true),
        "off" | "no" | "false" | "0" | "out" => Ok(false),
        other => bail!("Invalid state '{other}'. Use 'on' or 'off'"),
    }
}

pub(crate) fn print_ingredient_table(ingredients: &[Ingredient]) {
    #[derive(Tabled)]
    struct IngredientRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "On hand")]
        on_hand: &'static str,
    }

    let rows: Vec<IngredientRow> = ingredients
        .iter()
        .map(|i| IngredientRow {
            id: i.id,
            name: truncate(&i.name, 40),
            on_hand: if i.on_hand { "yes" } else { "-" },
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::center()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_recipe_table(recipes: &[Recipe]) {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Ingredients")]
        ingredients: usize,
        #[tabled(rename = "Created")]
        created: String,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            id: r.id,
            title: truncate(&r.title, 45),
            ingredients: r.ingredient_list().len(),
            created: r.created_at.chars().take(10).collect(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_recipe(recipe: &Recipe) {
    let title = &recipe.title;
    let id = recipe.id;
    println!("=== {title} === (id: {id})\n");

    println!("  INGREDIENTS:");
    let ingredients = recipe.ingredient_list();
    if ingredients.is_empty() {
        println!("    (none listed)");
    }
    for ing in &ingredients {
        println!("    • {}", ing.display());
    }

    println!("\n  INSTRUCTIONS:");
    for line in recipe.instructions.lines() {
        println!("    {line}");
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

/// Print a not-found message in the requested format and exit with status 2.
pub(crate) fn exit_not_found(message: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_on_off() {
        assert!(parse_on_off("on").unwrap());
        assert!(parse_on_off(" YES ").unwrap());
        assert!(!parse_on_off("off").unwrap());
        assert!(!parse_on_off("0").unwrap());
    }

    #[test]
    fn test_parse_on_off_invalid() {
        assert!(parse_on_off("maybe").is_err());
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("nope"), r#"{"error":"nope"}"#);
        // Quotes are escaped
        assert_eq!(json_error("a \"b\""), r#"{"error":"a \"b\""}"#);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        // Should not panic on multi-byte characters
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
        assert_eq!(truncate("日清カップヌードル", 8), "日清カップ...");
    }
}
