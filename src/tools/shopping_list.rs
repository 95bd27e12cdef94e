//! Shopping List MCP Tools
//!
//! Tools for building and maintaining a user's shopping list.

use serde::Serialize;

use super::share::{item_quantity_label, shopping_list_share_text, total_price, ShareText};
use crate::db::Database;
use crate::measure::{prepare_ingredients, UnitSystem};
use crate::models::{
    IngredientCategory, Recipe, ShoppingListItem, ShoppingListItemCreate, ShoppingListItemUpdate,
};

/// A shopping item with its display quantity
#[derive(Debug, Serialize)]
pub struct ShoppingListEntry {
    #[serde(flatten)]
    pub item: ShoppingListItem,
    pub display_name: String,
    pub quantity_display: Option<String>,
}

/// Response for list_shopping_list
#[derive(Debug, Serialize)]
pub struct ListShoppingListResponse {
    pub items: Vec<ShoppingListEntry>,
    pub count: usize,
    pub checked_count: usize,
    /// Sum of prices, present when any item is priced
    pub total_price: Option<f64>,
    pub currency: String,
}

/// Response for add_shopping_item
#[derive(Debug, Serialize)]
pub struct AddShoppingItemResponse {
    pub id: i64,
    pub text: String,
    /// False when the text was already on the list
    pub created: bool,
}

/// Response for add_missing_ingredients
#[derive(Debug, Serialize)]
pub struct AddMissingResponse {
    pub recipe: String,
    pub added: Vec<String>,
    pub already_listed: Vec<String>,
}

/// Response for toggle_shopping_item
#[derive(Debug, Serialize)]
pub struct ToggleItemResponse {
    pub id: i64,
    pub checked: bool,
}

/// Response for bulk changes
#[derive(Debug, Serialize)]
pub struct BulkChangeResponse {
    pub success: bool,
    pub affected: usize,
}

/// Response for successful delete
#[derive(Debug, Serialize)]
pub struct ItemDeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn parse_category(category: Option<&str>) -> Result<IngredientCategory, String> {
    match category {
        None => Ok(IngredientCategory::Other),
        Some(label) => IngredientCategory::parse(label).ok_or_else(|| {
            format!(
                "Unknown category '{}'. Use one of: {}",
                label,
                IngredientCategory::ALL
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }),
    }
}

fn check_price(price: Option<f64>) -> Result<(), String> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => {
            Err("price must be a non-negative number".to_string())
        }
        _ => Ok(()),
    }
}

fn check_quantity(quantity: Option<f64>) -> Result<(), String> {
    match quantity {
        Some(q) if !q.is_finite() || q < 0.0 => {
            Err("quantity must be a non-negative number".to_string())
        }
        _ => Ok(()),
    }
}

/// List a user's shopping list
pub fn list_shopping_list(
    db: &Database,
    user_id: i64,
    system: UnitSystem,
    currency: &str,
) -> Result<ListShoppingListResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = ShoppingListItem::list(&conn, user_id)
        .map_err(|e| format!("Failed to list shopping items: {}", e))?;

    let priced = items.iter().any(|item| item.price.is_some_and(|p| p > 0.0));
    let total = priced.then(|| total_price(&items));
    let checked_count = items.iter().filter(|item| item.checked).count();

    let entries: Vec<ShoppingListEntry> = items
        .into_iter()
        .map(|item| ShoppingListEntry {
            display_name: item.display_name().to_string(),
            quantity_display: item_quantity_label(&item, system),
            item,
        })
        .collect();

    Ok(ListShoppingListResponse {
        count: entries.len(),
        items: entries,
        checked_count,
        total_price: total,
        currency: currency.to_string(),
    })
}

/// Add a free-text item
pub fn add_shopping_item(
    db: &Database,
    user_id: i64,
    text: &str,
    category: Option<&str>,
    quantity: Option<f64>,
    unit: Option<String>,
    price: Option<f64>,
) -> Result<AddShoppingItemResponse, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("Item text cannot be empty".to_string());
    }
    check_price(price)?;
    check_quantity(quantity)?;

    let data = ShoppingListItemCreate {
        text: text.to_string(),
        category: parse_category(category)?,
        price,
        quantity,
        unit: unit.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
        ..Default::default()
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let existing = ShoppingListItem::find_by_text(&conn, user_id, text)
        .map_err(|e| format!("Failed to add item: {}", e))?;
    let id = ShoppingListItem::add(&conn, user_id, &data)
        .map_err(|e| format!("Failed to add item: {}", e))?;

    Ok(AddShoppingItemResponse {
        id,
        text: data.text,
        created: existing.is_none(),
    })
}

/// Add every ingredient of a recipe that wasn't seen in the fridge
///
/// Quantities are scaled to `servings` and converted to `system` first.
pub fn add_missing_ingredients(
    db: &Database,
    user_id: i64,
    recipe: &Recipe,
    servings: Option<u32>,
    system: UnitSystem,
) -> Result<AddMissingResponse, String> {
    let servings = servings.unwrap_or(recipe.servings);
    let prepared = prepare_ingredients(
        &recipe.ingredients,
        recipe.servings as f64,
        servings as f64,
        system,
    );

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let mut added = Vec::new();
    let mut already_listed = Vec::new();

    for ingredient in prepared.iter().filter(|i| !i.is_present) {
        let data = ShoppingListItemCreate::from_ingredient(ingredient);
        let inserted = ShoppingListItem::insert(&conn, user_id, &data)
            .map_err(|e| format!("Failed to add {}: {}", ingredient.name, e))?;
        match inserted {
            Some(_) => added.push(ingredient.name.clone()),
            None => already_listed.push(ingredient.name.clone()),
        }
    }

    Ok(AddMissingResponse {
        recipe: recipe.name.clone(),
        added,
        already_listed,
    })
}

/// Update an item's text, category, quantity, unit or price
#[allow(clippy::too_many_arguments)]
pub fn update_shopping_item(
    db: &Database,
    user_id: i64,
    id: i64,
    text: Option<String>,
    category: Option<&str>,
    quantity: Option<f64>,
    unit: Option<String>,
    price: Option<f64>,
    clear_price: bool,
) -> Result<Option<ShoppingListItem>, String> {
    if let Some(text) = &text {
        if text.trim().is_empty() {
            return Err("Item text cannot be empty".to_string());
        }
    }
    check_price(price)?;
    check_quantity(quantity)?;

    let data = ShoppingListItemUpdate {
        text: text.map(|t| t.trim().to_string()),
        category: category.map(|c| parse_category(Some(c))).transpose()?,
        quantity,
        unit: unit.map(|u| u.trim().to_string()),
        price: if clear_price { Some(None) } else { price.map(Some) },
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    ShoppingListItem::update(&conn, user_id, id, &data)
        .map_err(|e| format!("Failed to update item: {}", e))
}

/// Check or uncheck an item
pub fn toggle_shopping_item(
    db: &Database,
    user_id: i64,
    id: i64,
) -> Result<Option<ToggleItemResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let checked = ShoppingListItem::toggle_check(&conn, user_id, id)
        .map_err(|e| format!("Failed to toggle item: {}", e))?;

    Ok(checked.map(|checked| ToggleItemResponse { id, checked }))
}

/// Uncheck every item
pub fn uncheck_all_shopping_items(
    db: &Database,
    user_id: i64,
) -> Result<BulkChangeResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let affected = ShoppingListItem::uncheck_all(&conn, user_id)
        .map_err(|e| format!("Failed to uncheck items: {}", e))?;

    Ok(BulkChangeResponse {
        success: true,
        affected,
    })
}

/// Delete one item
pub fn delete_shopping_item(
    db: &Database,
    user_id: i64,
    id: i64,
) -> Result<Option<ItemDeleteResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = ShoppingListItem::delete(&conn, user_id, id)
        .map_err(|e| format!("Failed to delete item: {}", e))?;

    Ok(deleted.then_some(ItemDeleteResponse {
        success: true,
        deleted_id: id,
    }))
}

/// Delete the whole list
pub fn clear_shopping_list(db: &Database, user_id: i64) -> Result<BulkChangeResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let affected = ShoppingListItem::delete_all(&conn, user_id)
        .map_err(|e| format!("Failed to clear shopping list: {}", e))?;

    Ok(BulkChangeResponse {
        success: true,
        affected,
    })
}

/// Share text for the list
pub fn share_shopping_list(
    db: &Database,
    user_id: i64,
    system: UnitSystem,
    currency: &str,
) -> Result<ShareText, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = ShoppingListItem::list(&conn, user_id)
        .map_err(|e| format!("Failed to list shopping items: {}", e))?;
    if items.is_empty() {
        return Err("The shopping list is empty".to_string());
    }

    Ok(shopping_list_share_text(&items, system, currency))
}

/// Item texts, for asking the engine what to cook with them
pub fn shopping_list_ingredients(db: &Database, user_id: i64) -> Result<Vec<String>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = ShoppingListItem::list(&conn, user_id)
        .map_err(|e| format!("Failed to list shopping items: {}", e))?;

    Ok(items.into_iter().map(|item| item.text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::tests::sample_recipe;
    use crate::tools::users::create_user;

    fn setup() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let user = create_user(&db, "Sky", None, None).unwrap();
        (db, user.id)
    }

    #[test]
    fn test_add_and_list() {
        let (db, user_id) = setup();
        let first = add_shopping_item(&db, user_id, "Oat milk", Some("dairy"), Some(1.0), Some("l".into()), Some(2.49)).unwrap();
        assert!(first.created);
        let again = add_shopping_item(&db, user_id, " Oat milk ", None, None, None, None).unwrap();
        assert!(!again.created);
        assert_eq!(again.id, first.id);

        let listed = list_shopping_list(&db, user_id, UnitSystem::Imperial, "$").unwrap();
        assert_eq!(listed.count, 1);
        assert_eq!(listed.items[0].item.category, IngredientCategory::Dairy);
        assert_eq!(listed.items[0].quantity_display.as_deref(), Some("1 l"));
        assert_eq!(listed.total_price, Some(2.49));
    }

    #[test]
    fn test_add_validation() {
        let (db, user_id) = setup();
        assert!(add_shopping_item(&db, user_id, " ", None, None, None, None).is_err());
        assert!(add_shopping_item(&db, user_id, "Eggs", Some("Frozen"), None, None, None).is_err());
        assert!(add_shopping_item(&db, user_id, "Eggs", None, None, None, Some(-1.0)).is_err());
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let (db, user_id) = setup();
        let err = add_shopping_item(&db, user_id, "Eggs", None, Some(-2.0), None, None)
            .unwrap_err();
        assert!(err.contains("quantity"));
        let infinite = Some(f64::INFINITY);
        assert!(add_shopping_item(&db, user_id, "Eggs", None, infinite, None, None).is_err());

        let added = add_shopping_item(&db, user_id, "Eggs", None, Some(0.0), None, None).unwrap();
        assert!(added.created);
        let rejected = update_shopping_item(
            &db, user_id, added.id, None, None, Some(-1.0), None, None, false,
        );
        assert!(rejected.is_err());

        let listed = list_shopping_list(&db, user_id, UnitSystem::Metric, "$").unwrap();
        assert_eq!(listed.items[0].item.quantity, Some(0.0));
    }

    #[test]
    fn test_add_missing_ingredients_skips_present_and_listed() {
        let (db, user_id) = setup();
        let recipe = sample_recipe("Lemon Pasta");

        let result = add_missing_ingredients(&db, user_id, &recipe, Some(4), UnitSystem::Metric).unwrap();
        assert_eq!(result.added, vec!["Lemon"]);
        assert!(result.already_listed.is_empty());

        let listed = list_shopping_list(&db, user_id, UnitSystem::Metric, "$").unwrap();
        assert_eq!(listed.items[0].quantity_display.as_deref(), Some("2 each"));
        assert_eq!(listed.total_price, None);

        let again = add_missing_ingredients(&db, user_id, &recipe, None, UnitSystem::Metric).unwrap();
        assert_eq!(again.already_listed, vec!["Lemon"]);
    }

    #[test]
    fn test_update_toggle_and_clear() {
        let (db, user_id) = setup();
        let added = add_shopping_item(&db, user_id, "Rice", None, None, None, Some(3.0)).unwrap();

        let updated = update_shopping_item(&db, user_id, added.id, None, Some("Pantry"), Some(1.0), Some("kg".into()), None, true)
            .unwrap()
            .unwrap();
        assert_eq!(updated.category, IngredientCategory::Pantry);
        assert_eq!(updated.price, None);

        assert!(toggle_shopping_item(&db, user_id, added.id).unwrap().unwrap().checked);
        assert_eq!(uncheck_all_shopping_items(&db, user_id).unwrap().affected, 1);
        assert!(toggle_shopping_item(&db, user_id, 404).unwrap().is_none());

        let share = share_shopping_list(&db, user_id, UnitSystem::Imperial, "$").unwrap();
        assert!(share.text.contains("[ ] Rice (1 kg)"));

        assert_eq!(shopping_list_ingredients(&db, user_id).unwrap(), vec!["Rice"]);
        assert!(delete_shopping_item(&db, user_id, added.id).unwrap().is_some());
        assert_eq!(clear_shopping_list(&db, user_id).unwrap().affected, 0);
        assert!(share_shopping_list(&db, user_id, UnitSystem::Metric, "$").is_err());
    }
}
