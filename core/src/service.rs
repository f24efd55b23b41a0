use std::path::Path;
use std::sync::Arc;

use crate::db::Database;
use crate::error::{Error, ReportError, Result};
use crate::generation::{RecipeGenerationService, RecipeGenerator};
use crate::models::{Recipe, ReportReceipt};
use crate::report::{ReportEndpoint, ReportSubmissionService};
use crate::scope::RequestScope;
use crate::store::{IngredientStore, RecipeStore};

/// Explicitly constructed storage handle plus the pipelines built on top of it.
///
/// Cloning is cheap; clones share the same database and subscribers.
#[derive(Clone)]
pub struct PantryService {
    ingredients: IngredientStore,
    recipes: RecipeStore,
}

impl PantryService {
    pub fn new(db_path: &Path) -> Result<Self> {
        Self::from_database(Database::open(db_path)?)
    }

    pub fn new_in_memory() -> Result<Self> {
        Self::from_database(Database::open_in_memory()?)
    }

    pub fn from_database(db: Database) -> Result<Self> {
        let db = Arc::new(db);
        Ok(Self {
            ingredients: IngredientStore::new(Arc::clone(&db))?,
            recipes: RecipeStore::new(db)?,
        })
    }

    #[must_use]
    pub fn ingredients(&self) -> &IngredientStore {
        &self.ingredients
    }

    #[must_use]
    pub fn recipes(&self) -> &RecipeStore {
        &self.recipes
    }

    #[must_use]
    pub fn generation(&self, generator: Arc<dyn RecipeGenerator>) -> RecipeGenerationService {
        RecipeGenerationService::new(self.recipes.clone(), generator)
    }

    #[must_use]
    pub fn reports(&self, endpoint: Arc<dyn ReportEndpoint>) -> ReportSubmissionService {
        ReportSubmissionService::new(endpoint)
    }

    // --- Orchestrated flows ---

    /// Snapshot the on-hand ingredients, generate a recipe for them, and store it
    /// while `scope` stays open.
    pub async fn generate_recipe(
        &self,
        generation: &RecipeGenerationService,
        style: &str,
        scope: &RequestScope,
    ) -> Result<Recipe> {
        let on_hand = self.ingredients.on_hand_names()?;
        generation.generate_in_scope(scope, style, &on_hand).await
    }

    /// Look up a stored recipe and report it. Lookup failures are reported as
    /// [`Error`]; submission failures come back as [`ReportError`] inside `Ok`.
    pub async fn report_recipe(
        &self,
        reports: &ReportSubmissionService,
        recipe_id: i64,
        reason: &str,
    ) -> Result<std::result::Result<ReportReceipt, ReportError>> {
        let recipe = self.recipes.get(recipe_id)?;
        Ok(reports.submit_recipe(&recipe, reason).await)
    }

    /// Resolve a recipe by numeric id or, failing that, by title.
    pub fn resolve_recipe(&self, reference: &str) -> Result<Recipe> {
        if let Ok(id) = reference.trim().parse::<i64>() {
            return self.recipes.get(id);
        }
        self.recipes
            .find_by_title(reference)?
            .ok_or_else(|| Error::validation(format!("No recipe matching '{reference}'")))
    }
}
