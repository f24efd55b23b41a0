//! Recipe generation: prompt, structured-output request, strict decode, store.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::models::{Recipe, RecipeIngredient};
use crate::prompt::build_prompt;
use crate::scope::RequestScope;
use crate::store::RecipeStore;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const JSON_MIME_TYPE: &str = "application/json";

/// Everything a generation backend needs for one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub response_mime_type: String,
    pub response_schema: Value,
}

/// Text-generation backend.
///
/// The CLI implements this over the Gemini REST API; tests use in-process fakes.
/// `Ok(None)` means the backend answered but produced no text.
#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<Option<String>>;
}

/// Structured-output schema every response must follow.
#[must_use]
pub fn recipe_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "ingredients": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "quantity": { "type": "STRING" },
                        "unit": { "type": "STRING" }
                    },
                    "required": ["name", "quantity", "unit"]
                }
            },
            "instructions": { "type": "STRING" }
        },
        "required": ["title", "ingredients", "instructions"],
        "propertyOrdering": ["title", "ingredients", "instructions"]
    })
}

/// A decoded generation response that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedRecipe {
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: String,
}

impl GeneratedRecipe {
    /// Strictly decode raw response text. Nothing from the payload is used until
    /// the required fields have been checked.
    pub fn parse(raw: &str) -> Result<Self> {
        let recipe: GeneratedRecipe = serde_json::from_str(raw.trim())
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;
        if recipe.title.trim().is_empty() {
            return Err(Error::MalformedResponse("title is empty".to_string()));
        }
        if recipe.instructions.trim().is_empty() {
            return Err(Error::MalformedResponse("instructions are empty".to_string()));
        }
        Ok(recipe)
    }

    /// The stored form of the ingredient list.
    pub fn ingredients_payload(&self) -> Result<String> {
        serde_json::to_string(&self.ingredients)
            .map_err(|e| Error::MalformedResponse(format!("ingredients not serializable: {e}")))
    }
}

#[derive(Clone)]
pub struct RecipeGenerationService {
    recipes: RecipeStore,
    generator: Arc<dyn RecipeGenerator>,
    model: String,
}

impl RecipeGenerationService {
    pub fn new(recipes: RecipeStore, generator: Arc<dyn RecipeGenerator>) -> Self {
        Self {
            recipes,
            generator,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn request_for<S: AsRef<str>>(&self, style: &str, on_hand: &[S]) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            prompt: build_prompt(style, on_hand),
            response_mime_type: JSON_MIME_TYPE.to_string(),
            response_schema: recipe_response_schema(),
        }
    }

    /// Generate a recipe and append it to the store.
    pub async fn generate<S: AsRef<str>>(&self, style: &str, on_hand: &[S]) -> Result<Recipe> {
        self.generate_in_scope(&RequestScope::detached(), style, on_hand)
            .await
    }

    /// Like [`generate`](Self::generate), but the store write only happens while
    /// `scope` is open. A closed scope yields [`Error::Abandoned`] and stores nothing.
    pub async fn generate_in_scope<S: AsRef<str>>(
        &self,
        scope: &RequestScope,
        style: &str,
        on_hand: &[S],
    ) -> Result<Recipe> {
        let request = self.request_for(style, on_hand);
        tracing::debug!(model = %request.model, prompt = %request.prompt, "requesting recipe");

        let raw = match self.generator.generate(&request).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::warn!("generator returned no text");
                return Err(Error::MalformedResponse(
                    "response contained no text".to_string(),
                ));
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "recipe generation failed");
                return Err(Error::Generation(format!("{e:#}")));
            }
        };

        let generated = GeneratedRecipe::parse(&raw).inspect_err(|e| {
            tracing::warn!(error = %e, "discarding malformed recipe response");
        })?;
        let payload = generated.ingredients_payload()?;

        if !scope.is_open() {
            tracing::debug!(title = %generated.title, "request abandoned, recipe not stored");
            return Err(Error::Abandoned);
        }
        self.recipes
            .add_in_scope(scope, &generated.title, &payload, &generated.instructions)
    }
}
