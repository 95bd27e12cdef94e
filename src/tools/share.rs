//! Share Tools
//!
//! Plain-text renderings of recipes and shopping lists for pasting into
//! messages or notes.

use serde::Serialize;

use crate::measure::{convert_ingredient, format_quantity, UnitSystem};
use crate::models::{IngredientCategory, Ingredient, Recipe, ShoppingListItem};

/// Text ready to share
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareText {
    pub title: String,
    pub text: String,
}

impl ShareText {
    /// Title and text as one block, for clipboard-style sharing
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.title, self.text)
    }
}

/// "<quantity> <unit>", or just the quantity when there is no unit
pub fn quantity_label(quantity: f64, unit: &str) -> String {
    let unit = unit.trim();
    if unit.is_empty() {
        format_quantity(quantity)
    } else {
        format!("{} {}", format_quantity(quantity), unit)
    }
}

fn ingredient_line(ingredient: &Ingredient) -> String {
    format!(
        "- {} {}",
        quantity_label(ingredient.quantity, &ingredient.unit),
        ingredient.name
    )
}

/// Recipe as description, ingredients and numbered steps
pub fn recipe_share_text(recipe: &Recipe) -> ShareText {
    let ingredients = recipe
        .ingredients
        .iter()
        .map(ingredient_line)
        .collect::<Vec<_>>()
        .join("\n");

    let instructions = recipe
        .instructions
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n");

    ShareText {
        title: recipe.name.clone(),
        text: format!(
            "{}\n\nIngredients:\n{}\n\nInstructions:\n{}",
            recipe.description, ingredients, instructions
        ),
    }
}

/// Quantity shown for a shopping item, converted when it links an ingredient
pub fn item_quantity_label(item: &ShoppingListItem, system: UnitSystem) -> Option<String> {
    if let Some(ingredient) = &item.ingredient {
        let converted = convert_ingredient(ingredient, system);
        return Some(quantity_label(converted.quantity, &converted.unit));
    }
    match item.quantity {
        Some(quantity) if quantity != 0.0 => Some(quantity_label(
            quantity,
            item.unit.as_deref().unwrap_or(""),
        )),
        _ => None,
    }
}

/// Sum of item prices
pub fn total_price(items: &[ShoppingListItem]) -> f64 {
    items.iter().filter_map(|item| item.price).sum()
}

/// Shopping list grouped by category, with an estimated total when priced
pub fn shopping_list_share_text(
    items: &[ShoppingListItem],
    system: UnitSystem,
    currency: &str,
) -> ShareText {
    let mut sections = Vec::new();

    for category in IngredientCategory::ALL {
        let lines: Vec<String> = items
            .iter()
            .filter(|item| item.category == category)
            .map(|item| {
                let mark = if item.checked { "[x]" } else { "[ ]" };
                match item_quantity_label(item, system) {
                    Some(qty) => format!("{} {} ({})", mark, item.display_name(), qty),
                    None => format!("{} {}", mark, item.display_name()),
                }
            })
            .collect();

        if !lines.is_empty() {
            sections.push(format!(
                "{}:\n{}",
                category.as_str().to_uppercase(),
                lines.join("\n")
            ));
        }
    }

    let mut text = format!("Shopping List:\n\n{}", sections.join("\n\n"));

    let priced = items.iter().any(|item| item.price.is_some_and(|p| p > 0.0));
    if priced {
        text.push_str(&format!("\n\nTotal Est: {}{:.2}", currency, total_price(items)));
    }

    ShareText {
        title: "My Shopping List".to_string(),
        text,
    }
}
