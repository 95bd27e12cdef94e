//! Recipe response contract
//!
//! The JSON schema sent to the engine and the validation applied to what
//! comes back.

use serde_json::{json, Value};
use tracing::{debug, warn};

use super::AiError;
use crate::models::{IngredientCategory, Recipe, RecipeDraft};

/// Response schema for an array of recipes
pub fn recipe_response_schema() -> Value {
    let categories: Vec<&str> = IngredientCategory::ALL.iter().map(|c| c.as_str()).collect();

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING", "description": "The name of the dish." },
                "description": { "type": "STRING", "description": "A short, enticing description." },
                "difficulty": { "type": "STRING", "description": "A rating from 'Easy', 'Medium', or 'Hard'." },
                "prepTime": { "type": "INTEGER", "description": "Estimated preparation and cooking time in minutes." },
                "calories": { "type": "INTEGER", "description": "Estimated calories per serving." },
                "servings": { "type": "INTEGER", "description": "The default number of servings this recipe yields." },
                "dietaryTags": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Dietary classifications like 'Vegetarian', 'Keto', etc."
                },
                "ingredients": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING" },
                            "quantity": { "type": "NUMBER", "description": "The numeric value for the quantity." },
                            "unit": { "type": "STRING" },
                            "category": {
                                "type": "STRING",
                                "description": format!("One of: {}.", categories.join(", "))
                            },
                            "isPresent": { "type": "BOOLEAN", "description": "True if the ingredient is visible in the fridge." }
                        },
                        "required": ["name", "quantity", "unit", "category", "isPresent"]
                    }
                },
                "instructions": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "One step of the recipe per entry."
                }
            },
            "required": [
                "name", "description", "difficulty", "prepTime", "calories",
                "servings", "dietaryTags", "ingredients", "instructions"
            ]
        }
    })
}

/// Strip a Markdown code fence if the model wrapped its JSON in one
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parse and validate the engine's text response
///
/// Invalid records are logged and dropped. The call fails only when the text
/// is empty, isn't a JSON array, or every record in it is invalid.
pub fn parse_recipes(text: &str) -> Result<Vec<Recipe>, AiError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(AiError::EmptyResponse);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| AiError::MalformedResponse(e.to_string()))?;
    let Value::Array(records) = value else {
        return Err(AiError::MalformedResponse(
            "expected a JSON array of recipes".to_string(),
        ));
    };

    let total = records.len();
    let mut recipes = Vec::with_capacity(total);
    let mut last_error = None;

    for (index, record) in records.into_iter().enumerate() {
        let result = serde_json::from_value::<RecipeDraft>(record)
            .map_err(|e| e.to_string())
            .and_then(|draft| draft.validate().map_err(|e| e.to_string()));

        match result {
            Ok(recipe) => recipes.push(recipe),
            Err(e) => {
                warn!("Dropping recipe {} of {}: {}", index + 1, total, e);
                last_error = Some(e);
            }
        }
    }

    if recipes.is_empty() {
        if let Some(e) = last_error {
            return Err(AiError::MalformedResponse(e));
        }
    }

    debug!("Parsed {} of {} recipes", recipes.len(), total);
    Ok(recipes)
}
