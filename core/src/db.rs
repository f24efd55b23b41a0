use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Local;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Error, Result};
use crate::models::{Ingredient, NewRecipe, Recipe};

const INGREDIENT_COLUMNS: &str = "id, name, on_hand, created_at";
const RECIPE_COLUMNS: &str = "id, title, ingredients, instruction, created_at";

/// SQLite-backed storage for the ingredient and recipe tables.
///
/// Every statement runs under a single connection lock, so a `Database` can be
/// shared between tasks behind an `Arc`.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).inspect_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "failed to open database");
        })?;
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::Poisoned)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            // AUTOINCREMENT keeps ids from being reused after deletes.
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS ingredient (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    on_hand INTEGER NOT NULL DEFAULT 1,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS recipe (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    ingredients TEXT NOT NULL,
                    instruction TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_ingredient_name ON ingredient(name);
                CREATE INDEX IF NOT EXISTS idx_recipe_title ON recipe(title);

                PRAGMA user_version = 1;",
            )?;
            tracing::debug!("database schema created");
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn ingredient_from_row(row: &rusqlite::Row) -> rusqlite::Result<Ingredient> {
        Ok(Ingredient {
            id: row.get(0)?,
            name: row.get(1)?,
            on_hand: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn recipe_from_row(row: &rusqlite::Row) -> rusqlite::Result<Recipe> {
        Ok(Recipe {
            id: row.get(0)?,
            title: row.get(1)?,
            ingredients: row.get(2)?,
            instructions: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    // --- Ingredients ---

    pub fn insert_ingredient(&self, name: &str) -> Result<Ingredient> {
        let now = Local::now().to_rfc3339();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO ingredient (name, on_hand, created_at) VALUES (?1, 1, ?2)",
            params![name, now],
        )?;
        Ok(Ingredient {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            on_hand: true,
            created_at: now,
        })
    }

    pub fn get_ingredient(&self, id: i64) -> Result<Ingredient> {
        self.conn()?
            .query_row(
                &format!("SELECT {INGREDIENT_COLUMNS} FROM ingredient WHERE id = ?1"),
                params![id],
                Self::ingredient_from_row,
            )
            .optional()?
            .ok_or(Error::NotFound {
                entity: "Ingredient",
                id,
            })
    }

    pub fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>> {
        let found = self
            .conn()?
            .query_row(
                &format!(
                    "SELECT {INGREDIENT_COLUMNS} FROM ingredient
                     WHERE LOWER(name) = LOWER(?1) ORDER BY id LIMIT 1"
                ),
                params![name.trim()],
                Self::ingredient_from_row,
            )
            .optional()?;
        Ok(found)
    }

    pub fn delete_ingredient(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()?
            .execute("DELETE FROM ingredient WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Returns false when no ingredient has the given id.
    pub fn set_ingredient_on_hand(&self, id: i64, on_hand: bool) -> Result<bool> {
        let rows = self.conn()?.execute(
            "UPDATE ingredient SET on_hand = ?1 WHERE id = ?2",
            params![on_hand, id],
        )?;
        Ok(rows > 0)
    }

    pub fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredient ORDER BY id"
        ))?;
        let ingredients = stmt
            .query_map([], Self::ingredient_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ingredients)
    }

    pub fn list_on_hand_ingredients(&self) -> Result<Vec<Ingredient>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredient WHERE on_hand = 1 ORDER BY id"
        ))?;
        let ingredients = stmt
            .query_map([], Self::ingredient_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ingredients)
    }

    // --- Recipes ---

    pub fn insert_recipe(&self, recipe: &NewRecipe) -> Result<Recipe> {
        let now = Local::now().to_rfc3339();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO recipe (title, ingredients, instruction, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![recipe.title, recipe.ingredients, recipe.instructions, now],
        )?;
        Ok(Recipe {
            id: conn.last_insert_rowid(),
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            created_at: now,
        })
    }

    pub fn get_recipe(&self, id: i64) -> Result<Recipe> {
        self.conn()?
            .query_row(
                &format!("SELECT {RECIPE_COLUMNS} FROM recipe WHERE id = ?1"),
                params![id],
                Self::recipe_from_row,
            )
            .optional()?
            .ok_or(Error::NotFound { entity: "Recipe", id })
    }

    /// Most recent recipe whose title contains `title`, case-insensitively.
    pub fn find_recipe_by_title(&self, title: &str) -> Result<Option<Recipe>> {
        let escaped = title
            .trim()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");
        let found = self
            .conn()?
            .query_row(
                &format!(
                    "SELECT {RECIPE_COLUMNS} FROM recipe
                     WHERE title LIKE ?1 ESCAPE '\\' ORDER BY id DESC LIMIT 1"
                ),
                params![pattern],
                Self::recipe_from_row,
            )
            .optional()?;
        Ok(found)
    }

    /// Newest first.
    pub fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipe ORDER BY id DESC"
        ))?;
        let recipes = stmt
            .query_map([], Self::recipe_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    pub fn count_recipes(&self) -> Result<i64> {
        let count = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM recipe", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn delete_recipe(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()?
            .execute("DELETE FROM recipe WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn clear_recipes(&self) -> Result<usize> {
        let rows = self.conn()?.execute("DELETE FROM recipe", [])?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soup() -> NewRecipe {
        NewRecipe {
            title: "Carrot Soup".to_string(),
            ingredients: r#"[{"name":"carrot","quantity":"2","unit":"pcs"}]"#.to_string(),
            instructions: "Boil it.".to_string(),
        }
    }

    #[test]
    fn test_insert_and_get_ingredient() {
        let db = Database::open_in_memory().unwrap();
        let ing = db.insert_ingredient("Carrot").unwrap();

        assert_eq!(ing.name, "Carrot");
        assert!(ing.on_hand);

        let fetched = db.get_ingredient(ing.id).unwrap();
        assert_eq!(fetched, ing);
    }

    #[test]
    fn test_get_ingredient_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db.get_ingredient(42).unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound {
                entity: "Ingredient",
                id: 42
            }
        ));
    }

    #[test]
    fn test_set_on_hand_and_filtered_list() {
        let db = Database::open_in_memory().unwrap();
        let carrot = db.insert_ingredient("Carrot").unwrap();
        let onion = db.insert_ingredient("Onion").unwrap();
        let leek = db.insert_ingredient("Leek").unwrap();

        assert!(db.set_ingredient_on_hand(onion.id, false).unwrap());
        assert!(!db.set_ingredient_on_hand(999, false).unwrap());

        let all: Vec<i64> = db.list_ingredients().unwrap().iter().map(|i| i.id).collect();
        assert_eq!(all, vec![carrot.id, onion.id, leek.id]);

        let on_hand: Vec<i64> = db
            .list_on_hand_ingredients()
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(on_hand, vec![carrot.id, leek.id]);
    }

    #[test]
    fn test_delete_ingredient() {
        let db = Database::open_in_memory().unwrap();
        let ing = db.insert_ingredient("Carrot").unwrap();

        assert!(db.delete_ingredient(ing.id).unwrap());
        // Deleting again should return false
        assert!(!db.delete_ingredient(ing.id).unwrap());
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_ingredient("Carrot").unwrap();
        db.delete_ingredient(first.id).unwrap();
        let second = db.insert_ingredient("Carrot").unwrap();
        assert!(second.id > first.id);

        let r1 = db.insert_recipe(&soup()).unwrap();
        db.delete_recipe(r1.id).unwrap();
        let r2 = db.insert_recipe(&soup()).unwrap();
        assert!(r2.id > r1.id);
    }

    #[test]
    fn test_find_ingredient_by_name_case_insensitive() {
        let db = Database::open_in_memory().unwrap();
        db.insert_ingredient("Red Onion").unwrap();

        let found = db.find_ingredient_by_name("red onion").unwrap().unwrap();
        assert_eq!(found.name, "Red Onion");
        assert!(db.find_ingredient_by_name("onion").unwrap().is_none());
    }

    #[test]
    fn test_recipes_listed_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let a = db.insert_recipe(&soup()).unwrap();
        let b = db
            .insert_recipe(&NewRecipe {
                title: "Leek Pie".to_string(),
                ..soup()
            })
            .unwrap();

        let ids: Vec<i64> = db.list_recipes().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
        assert_eq!(db.count_recipes().unwrap(), 2);
    }

    #[test]
    fn test_get_recipe_roundtrips_payload() {
        let db = Database::open_in_memory().unwrap();
        let inserted = db.insert_recipe(&soup()).unwrap();
        let fetched = db.get_recipe(inserted.id).unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.ingredient_list()[0].unit, "pcs");
    }

    #[test]
    fn test_find_recipe_by_title() {
        let db = Database::open_in_memory().unwrap();
        db.insert_recipe(&soup()).unwrap();

        let found = db.find_recipe_by_title("carrot").unwrap().unwrap();
        assert_eq!(found.title, "Carrot Soup");
        assert!(db.find_recipe_by_title("100%").unwrap().is_none());
    }

    #[test]
    fn test_clear_recipes() {
        let db = Database::open_in_memory().unwrap();
        db.insert_recipe(&soup()).unwrap();
        db.insert_recipe(&soup()).unwrap();

        assert_eq!(db.clear_recipes().unwrap(), 2);
        assert_eq!(db.count_recipes().unwrap(), 0);
        assert_eq!(db.clear_recipes().unwrap(), 0);
    }

    #[test]
    fn test_reopen_persists_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pantry.db");

        {
            let db = Database::open(&path).unwrap();
            db.insert_ingredient("Carrot").unwrap();
            db.insert_recipe(&soup()).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_ingredients().unwrap().len(), 1);
        assert_eq!(db.list_recipes().unwrap()[0].title, "Carrot Soup");
    }
}
