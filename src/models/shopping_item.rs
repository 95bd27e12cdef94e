//! Shopping list model
//!
//! One row per (user, text). Items added from a recipe keep a copy of the
//! ingredient so the quantity can be shown in either unit system.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{Ingredient, IngredientCategory};
use crate::db::columns::{optional_json_column, to_json_text};
use crate::db::DbResult;

/// A shopping list item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub text: String,
    #[serde(default)]
    pub category: IngredientCategory,
    #[serde(default)]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient: Option<Ingredient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Data for adding a shopping list item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShoppingListItemCreate {
    pub text: String,
    #[serde(default)]
    pub category: IngredientCategory,
    #[serde(default)]
    pub checked: bool,
    pub price: Option<f64>,
    pub ingredient: Option<Ingredient>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl ShoppingListItemCreate {
    /// Free-text item in the Other category
    pub fn from_text(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
            ..Default::default()
        }
    }

    /// Item linked to a recipe ingredient, named after it
    pub fn from_ingredient(ingredient: &Ingredient) -> Self {
        Self {
            text: ingredient.name.clone(),
            category: ingredient.category,
            ingredient: Some(Ingredient {
                is_present: false,
                ..ingredient.clone()
            }),
            ..Default::default()
        }
    }
}

impl From<&ShoppingListItem> for ShoppingListItemCreate {
    fn from(item: &ShoppingListItem) -> Self {
        Self {
            text: item.text.clone(),
            category: item.category,
            checked: item.checked,
            price: item.price,
            ingredient: item.ingredient.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
        }
    }
}

/// Data for updating a shopping list item
///
/// `price` uses a double option: `Some(None)` clears the price.
#[derive(Debug, Clone, Default)]
pub struct ShoppingListItemUpdate {
    pub text: Option<String>,
    pub category: Option<IngredientCategory>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub price: Option<Option<f64>>,
}

impl ShoppingListItem {
    /// Name shown for the item: the linked ingredient's name, else the text
    pub fn display_name(&self) -> &str {
        self.ingredient
            .as_ref()
            .map(|i| i.name.as_str())
            .unwrap_or(&self.text)
    }

    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let category: String = row.get("category")?;
        Ok(Self {
            id: Some(row.get("id")?),
            user_id: Some(row.get("user_id")?),
            text: row.get("text")?,
            category: IngredientCategory::from_str(&category),
            checked: row.get::<_, i32>("checked")? != 0,
            price: row.get("price")?,
            ingredient: optional_json_column(row, "ingredient")?,
            quantity: row.get("quantity")?,
            unit: row.get("unit")?,
        })
    }

    /// Insert unless the user already has an item with the same text
    ///
    /// Returns the new id, or `None` when the row was skipped.
    pub fn insert(
        conn: &Connection,
        user_id: i64,
        data: &ShoppingListItemCreate,
    ) -> DbResult<Option<i64>> {
        let ingredient = data
            .ingredient
            .as_ref()
            .map(|i| to_json_text(i))
            .transpose()?;

        let rows = conn.execute(
            r#"
            INSERT OR IGNORE INTO shopping_list
                (user_id, text, category, checked, price, ingredient, quantity, unit)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                user_id,
                data.text,
                data.category.as_str(),
                data.checked as i32,
                data.price,
                ingredient,
                data.quantity,
                data.unit,
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        Ok(Some(conn.last_insert_rowid()))
    }

    /// Add an item, returning the existing id if the text is already on the list
    pub fn add(conn: &Connection, user_id: i64, data: &ShoppingListItemCreate) -> DbResult<i64> {
        if let Some(existing) = Self::find_by_text(conn, user_id, &data.text)? {
            if let Some(id) = existing.id {
                return Ok(id);
            }
        }

        match Self::insert(conn, user_id, data)? {
            Some(id) => Ok(id),
            None => Self::find_by_text(conn, user_id, &data.text)?
                .and_then(|item| item.id)
                .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)),
        }
    }

    /// Get an item by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM shopping_list WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row).optional()?)
    }

    /// Find a user's item by exact text
    pub fn find_by_text(conn: &Connection, user_id: i64, text: &str) -> DbResult<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM shopping_list WHERE user_id = ?1 AND text = ?2")?;
        Ok(stmt.query_row(params![user_id, text], Self::from_row).optional()?)
    }

    /// A user's shopping list in insertion order
    pub fn list(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM shopping_list WHERE user_id = ?1 ORDER BY id")?;
        let items = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Update an item of a user
    pub fn update(
        conn: &Connection,
        user_id: i64,
        id: i64,
        data: &ShoppingListItemUpdate,
    ) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref text) = data.text {
            updates.push(format!("text = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(text.clone()));
        }
        if let Some(category) = data.category {
            updates.push(format!("category = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(category.as_str().to_string()));
        }
        if let Some(quantity) = data.quantity {
            updates.push(format!("quantity = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(quantity));
        }
        if let Some(ref unit) = data.unit {
            updates.push(format!("unit = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(unit.clone()));
        }
        if let Some(price) = data.price {
            updates.push(format!("price = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(price));
        }

        if updates.is_empty() {
            return Ok(Self::get_by_id(conn, id)?.filter(|item| item.user_id == Some(user_id)));
        }

        let sql = format!(
            "UPDATE shopping_list SET {} WHERE id = ?{} AND user_id = ?{}",
            updates.join(", "),
            params_vec.len() + 1,
            params_vec.len() + 2
        );
        params_vec.push(Box::new(id));
        params_vec.push(Box::new(user_id));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = conn.execute(&sql, params_refs.as_slice())?;
        if rows == 0 {
            return Ok(None);
        }

        Self::get_by_id(conn, id)
    }

    /// Flip the checked flag; returns the new state, or None if not found
    pub fn toggle_check(conn: &Connection, user_id: i64, id: i64) -> DbResult<Option<bool>> {
        let rows = conn.execute(
            "UPDATE shopping_list SET checked = 1 - checked WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        Ok(Self::get_by_id(conn, id)?.map(|item| item.checked))
    }

    /// Uncheck every item of a user; returns the number changed
    pub fn uncheck_all(conn: &Connection, user_id: i64) -> DbResult<usize> {
        Ok(conn.execute(
            "UPDATE shopping_list SET checked = 0 WHERE user_id = ?1 AND checked = 1",
            [user_id],
        )?)
    }

    /// Delete an item of a user
    pub fn delete(conn: &Connection, user_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM shopping_list WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// Delete a user's whole list; returns the number removed
    pub fn delete_all(conn: &Connection, user_id: i64) -> DbResult<usize> {
        Ok(conn.execute("DELETE FROM shopping_list WHERE user_id = ?1", [user_id])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{User, UserPreferences};

    fn setup() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let user = db
            .with_conn(|conn| User::create(conn, "Kim", "🧀", &UserPreferences::default(), 1))
            .unwrap();
        (db, user.id)
    }

    fn flour() -> Ingredient {
        Ingredient {
            name: "Flour".to_string(),
            quantity: 500.0,
            unit: "g".to_string(),
            category: IngredientCategory::Pantry,
            is_present: true,
        }
    }

    #[test]
    fn test_add_returns_existing_id_for_duplicate_text() {
        let (db, user_id) = setup();
        db.with_conn(|conn| {
            let first = ShoppingListItem::add(conn, user_id, &ShoppingListItemCreate::from_text("Eggs"))?;
            let second = ShoppingListItem::add(conn, user_id, &ShoppingListItemCreate::from_text("Eggs"))?;
            assert_eq!(first, second);
            assert_eq!(ShoppingListItem::list(conn, user_id)?.len(), 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_from_ingredient_links_and_clears_presence() {
        let (db, user_id) = setup();
        db.with_conn(|conn| {
            let id = ShoppingListItem::add(conn, user_id, &ShoppingListItemCreate::from_ingredient(&flour()))?;
            let item = ShoppingListItem::get_by_id(conn, id)?.unwrap();
            assert_eq!(item.text, "Flour");
            assert_eq!(item.category, IngredientCategory::Pantry);
            let linked = item.ingredient.unwrap();
            assert!(!linked.is_present);
            assert_eq!(linked.quantity, 500.0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_update_and_clear_price() {
        let (db, user_id) = setup();
        db.with_conn(|conn| {
            let id = ShoppingListItem::add(conn, user_id, &ShoppingListItemCreate::from_text("Milk"))?;
            let item = ShoppingListItem::update(
                conn,
                user_id,
                id,
                &ShoppingListItemUpdate {
                    category: Some(IngredientCategory::Dairy),
                    quantity: Some(2.0),
                    unit: Some("l".to_string()),
                    price: Some(Some(1.99)),
                    ..Default::default()
                },
            )?
            .unwrap();
            assert_eq!(item.category, IngredientCategory::Dairy);
            assert_eq!(item.price, Some(1.99));

            let item = ShoppingListItem::update(
                conn,
                user_id,
                id,
                &ShoppingListItemUpdate {
                    price: Some(None),
                    ..Default::default()
                },
            )?
            .unwrap();
            assert_eq!(item.price, None);
            assert_eq!(item.unit.as_deref(), Some("l"));

            // Other users cannot touch it
            assert!(ShoppingListItem::update(conn, user_id + 1, id, &ShoppingListItemUpdate::default())?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_toggle_uncheck_and_delete() {
        let (db, user_id) = setup();
        db.with_conn(|conn| {
            let a = ShoppingListItem::add(conn, user_id, &ShoppingListItemCreate::from_text("Apples"))?;
            let b = ShoppingListItem::add(conn, user_id, &ShoppingListItemCreate::from_text("Bread"))?;

            assert_eq!(ShoppingListItem::toggle_check(conn, user_id, a)?, Some(true));
            assert_eq!(ShoppingListItem::toggle_check(conn, user_id, b)?, Some(true));
            assert_eq!(ShoppingListItem::toggle_check(conn, user_id, b)?, Some(false));
            assert_eq!(ShoppingListItem::toggle_check(conn, user_id, 999)?, None);

            assert_eq!(ShoppingListItem::uncheck_all(conn, user_id)?, 1);
            assert!(ShoppingListItem::list(conn, user_id)?.iter().all(|i| !i.checked));

            assert!(ShoppingListItem::delete(conn, user_id, a)?);
            assert!(!ShoppingListItem::delete(conn, user_id, a)?);
            assert_eq!(ShoppingListItem::delete_all(conn, user_id)?, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_display_name_prefers_ingredient() {
        let mut item = ShoppingListItem {
            id: None,
            user_id: None,
            text: "flour for bread".to_string(),
            category: IngredientCategory::Pantry,
            checked: false,
            price: None,
            ingredient: None,
            quantity: None,
            unit: None,
        };
        assert_eq!(item.display_name(), "flour for bread");
        item.ingredient = Some(flour());
        assert_eq!(item.display_name(), "Flour");
    }
}
