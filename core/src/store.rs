//! Ingredient and recipe stores with push-based change notification.
//!
//! Both stores wrap the shared [`Database`] handle. Mutations are serialized per
//! store and each one publishes a fresh snapshot to live subscribers.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Ingredient, NewRecipe, Recipe, validate_ingredient_name};
use crate::scope::RequestScope;

/// Live view of a store list. Dropping it (or calling `cancel`) unsubscribes.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: watch::Receiver<Vec<T>>,
}

impl<T: Clone> Subscription<T> {
    /// The latest published snapshot, marking it as seen.
    pub fn current(&mut self) -> Vec<T> {
        self.rx.borrow_and_update().clone()
    }

    /// True when a snapshot newer than the last one seen has been published.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next published snapshot. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Vec<T>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn cancel(self) {
        drop(self.rx);
    }
}

fn writer(lock: &Mutex<()>) -> Result<MutexGuard<'_, ()>> {
    lock.lock().map_err(|_| Error::Poisoned)
}

#[derive(Clone)]
pub struct IngredientStore {
    db: Arc<Database>,
    write_lock: Arc<Mutex<()>>,
    all_tx: Arc<watch::Sender<Vec<Ingredient>>>,
    on_hand_tx: Arc<watch::Sender<Vec<Ingredient>>>,
}

impl IngredientStore {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let all = db.list_ingredients()?;
        let on_hand = all.iter().filter(|i| i.on_hand).cloned().collect();
        Ok(Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
            all_tx: Arc::new(watch::Sender::new(all)),
            on_hand_tx: Arc::new(watch::Sender::new(on_hand)),
        })
    }

    /// Add an on-hand ingredient. Blank names are rejected before touching the database.
    pub fn add(&self, name: &str) -> Result<Ingredient> {
        let name = validate_ingredient_name(name)?;
        let _writer = writer(&self.write_lock)?;
        let ingredient = self.db.insert_ingredient(&name)?;
        tracing::debug!(id = ingredient.id, name = %ingredient.name, "ingredient added");
        self.publish()?;
        Ok(ingredient)
    }

    /// Remove an ingredient. Unknown ids are not an error.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let _writer = writer(&self.write_lock)?;
        let removed = self.db.delete_ingredient(id)?;
        if removed {
            tracing::debug!(id, "ingredient deleted");
            self.publish()?;
        }
        Ok(removed)
    }

    pub fn set_on_hand(&self, id: i64, on_hand: bool) -> Result<Ingredient> {
        let _writer = writer(&self.write_lock)?;
        if !self.db.set_ingredient_on_hand(id, on_hand)? {
            return Err(Error::NotFound {
                entity: "Ingredient",
                id,
            });
        }
        self.publish()?;
        self.db.get_ingredient(id)
    }

    pub fn toggle(&self, id: i64) -> Result<Ingredient> {
        let _writer = writer(&self.write_lock)?;
        let current = self.db.get_ingredient(id)?;
        self.db.set_ingredient_on_hand(id, !current.on_hand)?;
        self.publish()?;
        Ok(Ingredient {
            on_hand: !current.on_hand,
            ..current
        })
    }

    pub fn get(&self, id: i64) -> Result<Ingredient> {
        self.db.get_ingredient(id)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Ingredient>> {
        self.db.find_ingredient_by_name(name)
    }

    pub fn list_all(&self) -> Result<Vec<Ingredient>> {
        self.db.list_ingredients()
    }

    pub fn list_on_hand(&self) -> Result<Vec<Ingredient>> {
        self.db.list_on_hand_ingredients()
    }

    /// Names of the on-hand ingredients, in list order.
    pub fn on_hand_names(&self) -> Result<Vec<String>> {
        Ok(self
            .list_on_hand()?
            .into_iter()
            .map(|i| i.name)
            .collect())
    }

    #[must_use]
    pub fn subscribe_all(&self) -> Subscription<Ingredient> {
        Subscription {
            rx: self.all_tx.subscribe(),
        }
    }

    #[must_use]
    pub fn subscribe_on_hand(&self) -> Subscription<Ingredient> {
        Subscription {
            rx: self.on_hand_tx.subscribe(),
        }
    }

    // Caller holds the write lock.
    fn publish(&self) -> Result<()> {
        let all = self.db.list_ingredients()?;
        let on_hand = all.iter().filter(|i| i.on_hand).cloned().collect();
        self.all_tx.send_replace(all);
        self.on_hand_tx.send_replace(on_hand);
        Ok(())
    }
}

/// Append-only log of generated recipes, listed newest first.
#[derive(Clone)]
pub struct RecipeStore {
    db: Arc<Database>,
    write_lock: Arc<Mutex<()>>,
    tx: Arc<watch::Sender<Vec<Recipe>>>,
}

impl RecipeStore {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let recipes = db.list_recipes()?;
        Ok(Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
            tx: Arc::new(watch::Sender::new(recipes)),
        })
    }

    pub fn add(&self, title: &str, ingredients: &str, instructions: &str) -> Result<Recipe> {
        self.add_in_scope(&RequestScope::detached(), title, ingredients, instructions)
    }

    /// Append a recipe, but only while `scope` is still open.
    ///
    /// Returns [`Error::Abandoned`] if the scope has already been closed.
    pub fn add_in_scope(
        &self,
        scope: &RequestScope,
        title: &str,
        ingredients: &str,
        instructions: &str,
    ) -> Result<Recipe> {
        let new = NewRecipe {
            title: title.trim().to_string(),
            ingredients: ingredients.to_string(),
            instructions: instructions.trim().to_string(),
        };
        new.validate()?;

        let _writer = writer(&self.write_lock)?;
        let recipe = scope
            .run_if_open(|| self.db.insert_recipe(&new))
            .ok_or(Error::Abandoned)??;
        tracing::info!(id = recipe.id, title = %recipe.title, "recipe stored");
        self.publish()?;
        Ok(recipe)
    }

    pub fn get(&self, id: i64) -> Result<Recipe> {
        self.db.get_recipe(id)
    }

    pub fn find_by_title(&self, title: &str) -> Result<Option<Recipe>> {
        self.db.find_recipe_by_title(title)
    }

    pub fn list_all(&self) -> Result<Vec<Recipe>> {
        self.db.list_recipes()
    }

    pub fn count(&self) -> Result<i64> {
        self.db.count_recipes()
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let _writer = writer(&self.write_lock)?;
        let removed = self.db.delete_recipe(id)?;
        if removed {
            self.publish()?;
        }
        Ok(removed)
    }

    pub fn clear(&self) -> Result<usize> {
        let _writer = writer(&self.write_lock)?;
        let removed = self.db.clear_recipes()?;
        if removed > 0 {
            self.publish()?;
        }
        Ok(removed)
    }

    #[must_use]
    pub fn subscribe(&self) -> Subscription<Recipe> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    fn publish(&self) -> Result<()> {
        self.tx.send_replace(self.db.list_recipes()?);
        Ok(())
    }
}
