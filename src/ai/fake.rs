//! Fake recipe engine for testing.
//!
//! Returns canned recipes without network access. The canned text goes
//! through the same validation as real responses.

use async_trait::async_trait;

use super::schema::parse_recipes;
use super::{AiError, RecipeEngine};
use crate::models::Recipe;
use crate::photo::InlineImage;

/// 1x1 transparent PNG
const PLACEHOLDER_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

const CANNED_RECIPES: &str = r#"[
  {
    "name": "Tomato Basil Pasta",
    "description": "Bright weeknight pasta with fresh tomatoes",
    "difficulty": "Easy",
    "prepTime": 20,
    "calories": 520,
    "servings": 4,
    "dietaryTags": ["Vegetarian"],
    "ingredients": [
      {"name": "Spaghetti", "quantity": 400, "unit": "g", "category": "Pantry", "isPresent": true},
      {"name": "Cherry Tomatoes", "quantity": 500, "unit": "g", "category": "Produce", "isPresent": true},
      {"name": "Basil", "quantity": 0.5, "unit": "cup", "category": "Produce", "isPresent": false},
      {"name": "Olive Oil", "quantity": 2, "unit": "tbsp", "category": "Pantry", "isPresent": true},
      {"name": "Parmesan", "quantity": 50, "unit": "g", "category": "Dairy", "isPresent": false}
    ],
    "instructions": [
      "Boil the spaghetti in salted water.",
      "Blister the tomatoes in olive oil.",
      "Toss pasta with tomatoes, basil and parmesan."
    ]
  },
  {
    "name": "Lemon Garlic Salmon",
    "description": "Pan-seared salmon with a lemony butter sauce",
    "difficulty": "Medium",
    "prepTime": 25,
    "calories": 430,
    "servings": 2,
    "dietaryTags": ["Gluten-Free", "Keto"],
    "ingredients": [
      {"name": "Salmon Fillets", "quantity": 0.75, "unit": "lb", "category": "Seafood", "isPresent": true},
      {"name": "Lemon", "quantity": 1, "unit": "", "category": "Produce", "isPresent": true},
      {"name": "Garlic", "quantity": 3, "unit": "cloves", "category": "Produce", "isPresent": true},
      {"name": "Butter", "quantity": 2, "unit": "tbsp", "category": "Dairy", "isPresent": false}
    ],
    "instructions": [
      "Season and sear the salmon skin side down.",
      "Flip, add butter, garlic and lemon juice.",
      "Baste for two minutes and serve."
    ]
  },
  {
    "name": "Chickpea Curry",
    "description": "Creamy coconut curry ready in half an hour",
    "difficulty": "Medium",
    "prepTime": 30,
    "calories": 390,
    "servings": 4,
    "dietaryTags": ["Vegan", "Vegetarian", "Gluten-Free"],
    "ingredients": [
      {"name": "Chickpeas", "quantity": 800, "unit": "g", "category": "Pantry", "isPresent": true},
      {"name": "Coconut Milk", "quantity": 400, "unit": "ml", "category": "Pantry", "isPresent": false},
      {"name": "Onion", "quantity": 1, "unit": "", "category": "Produce", "isPresent": true},
      {"name": "Curry Powder", "quantity": 2, "unit": "tbsp", "category": "Spices", "isPresent": true}
    ],
    "instructions": [
      "Soften the onion.",
      "Stir in curry powder, chickpeas and coconut milk.",
      "Simmer for 15 minutes."
    ]
  }
]"#;

/// A fake recipe engine for testing.
#[derive(Debug, Clone)]
pub struct FakeEngine {
    /// Response text returned for every recipe request
    response: String,
    /// When set, every call fails with this HTTP status
    fail_status: Option<u16>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::with_response(CANNED_RECIPES)
    }
}

impl FakeEngine {
    /// Engine that returns the given text for recipe requests
    pub fn with_response(response: &str) -> Self {
        Self {
            response: response.to_string(),
            fail_status: None,
        }
    }

    /// Engine whose calls all fail as the API would with `status`
    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), AiError> {
        match self.fail_status {
            Some(status) => Err(AiError::Api {
                status,
                message: "fake failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecipeEngine for FakeEngine {
    async fn analyze_image(&self, image: &InlineImage) -> Result<Vec<Recipe>, AiError> {
        self.check()?;
        if image.data.is_empty() {
            return Err(AiError::Api {
                status: 400,
                message: "INVALID_ARGUMENT empty image".to_string(),
            });
        }
        parse_recipes(&self.response)
    }

    async fn generate_from_ingredients(
        &self,
        ingredients: &[String],
    ) -> Result<Vec<Recipe>, AiError> {
        self.check()?;
        let mut recipes = parse_recipes(&self.response)?;

        // Provided ingredients count as on hand
        for recipe in &mut recipes {
            for ingredient in &mut recipe.ingredients {
                if ingredients
                    .iter()
                    .any(|given| given.trim().eq_ignore_ascii_case(&ingredient.name))
                {
                    ingredient.is_present = true;
                }
            }
        }
        Ok(recipes)
    }

    async fn generate_image(&self, _name: &str, _description: &str) -> Result<Vec<String>, AiError> {
        self.check()?;
        Ok(vec![InlineImage {
            mime_type: "image/png".to_string(),
            data: PLACEHOLDER_PNG.to_string(),
        }
        .to_data_url()])
    }

    fn engine_name(&self) -> &'static str {
        "fake"
    }
}
