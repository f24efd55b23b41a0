use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub on_hand: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    /// JSON array of `{name, quantity, unit}` objects, stored verbatim.
    pub ingredients: String,
    pub instructions: String,
    pub created_at: String,
}

impl Recipe {
    /// Newline-joined title, ingredients payload and instructions, as sent with a report.
    #[must_use]
    pub fn transcript(&self) -> String {
        format!("{}\n{}\n{}", self.title, self.ingredients, self.instructions)
    }

    /// Decode the ingredients payload. The store treats the payload as opaque, so a
    /// payload that does not decode yields an empty list rather than an error.
    #[must_use]
    pub fn ingredient_list(&self) -> Vec<RecipeIngredient> {
        serde_json::from_str(&self.ingredients).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
}

impl NewRecipe {
    pub fn validate(&self) -> Result<()> {
        require_text("Recipe title", &self.title)?;
        require_text("Recipe instructions", &self.instructions)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: String,
    pub unit: String,
}

impl RecipeIngredient {
    /// "carrot (2 pcs)"
    #[must_use]
    pub fn display(&self) -> String {
        let amount = format!("{} {}", self.quantity, self.unit);
        let amount = amount.trim();
        if amount.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({amount})", self.name)
        }
    }
}

/// Payload of a `reportContent` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub content_id: String,
    pub recipe: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub report_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportReceipt {
    pub content_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
}

pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} must not be blank")));
    }
    Ok(())
}

/// Trim an ingredient name, rejecting blank input.
pub fn validate_ingredient_name(name: &str) -> Result<String> {
    require_text("Ingredient name", name)?;
    Ok(name.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soup() -> Recipe {
        Recipe {
            id: 1,
            title: "Soup".to_string(),
            ingredients: r#"[{"name":"carrot","quantity":"2","unit":"pcs"}]"#.to_string(),
            instructions: "Boil it.".to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_transcript_joins_with_newlines() {
        assert_eq!(
            soup().transcript(),
            "Soup\n[{\"name\":\"carrot\",\"quantity\":\"2\",\"unit\":\"pcs\"}]\nBoil it."
        );
    }

    #[test]
    fn test_ingredient_list_decodes_payload() {
        let list = soup().ingredient_list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "carrot");
        assert_eq!(list[0].display(), "carrot (2 pcs)");
    }

    #[test]
    fn test_ingredient_list_tolerates_garbage() {
        let mut recipe = soup();
        recipe.ingredients = "not json".to_string();
        assert!(recipe.ingredient_list().is_empty());
    }

    #[test]
    fn test_display_without_amount() {
        let ing = RecipeIngredient {
            name: "salt".to_string(),
            quantity: String::new(),
            unit: String::new(),
        };
        assert_eq!(ing.display(), "salt");
    }

    #[test]
    fn test_validate_ingredient_name() {
        assert_eq!(validate_ingredient_name("  leek ").unwrap(), "leek");
        assert!(matches!(
            validate_ingredient_name("   "),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_new_recipe_requires_title_and_instructions() {
        let mut new = NewRecipe {
            title: "Soup".to_string(),
            ingredients: "[]".to_string(),
            instructions: "Boil it.".to_string(),
        };
        assert!(new.validate().is_ok());

        new.title = " ".to_string();
        assert!(matches!(new.validate(), Err(Error::Validation(_))));

        new.title = "Soup".to_string();
        new.instructions = String::new();
        assert!(matches!(new.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_report_request_wire_names() {
        let req = ReportRequest {
            content_id: "7".to_string(),
            recipe: "Soup".to_string(),
            reason: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"contentId": "7", "recipe": "Soup", "reason": null})
        );
    }
}
