//! Ingredient model
//!
//! An ingredient line of a recipe as proposed by the AI engine.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Grocery category used for grouping ingredients and shopping items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String")]
pub enum IngredientCategory {
    Produce,
    Dairy,
    Meat,
    Seafood,
    Pantry,
    Spices,
    Bakery,
    #[default]
    Other,
}

impl IngredientCategory {
    /// All categories in display order
    pub const ALL: [IngredientCategory; 8] = [
        IngredientCategory::Produce,
        IngredientCategory::Dairy,
        IngredientCategory::Meat,
        IngredientCategory::Seafood,
        IngredientCategory::Pantry,
        IngredientCategory::Spices,
        IngredientCategory::Bakery,
        IngredientCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientCategory::Produce => "Produce",
            IngredientCategory::Dairy => "Dairy",
            IngredientCategory::Meat => "Meat",
            IngredientCategory::Seafood => "Seafood",
            IngredientCategory::Pantry => "Pantry",
            IngredientCategory::Spices => "Spices",
            IngredientCategory::Bakery => "Bakery",
            IngredientCategory::Other => "Other",
        }
    }

    /// Parse a category label, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
    }

    /// Parse a category label, falling back to Other
    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

/// Stored records keep whatever label they were saved with; unknown labels
/// read as Other. Engine output is checked strictly in `IngredientDraft`.
impl From<String> for IngredientCategory {
    fn from(value: String) -> Self {
        Self::from_str(&value)
    }
}

impl std::fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingredient of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub category: IngredientCategory,
    /// Whether the ingredient was seen in the source photo
    #[serde(default)]
    pub is_present: bool,
}

impl Ingredient {
    /// Copy of this ingredient with a different quantity
    pub fn with_quantity(&self, quantity: f64) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }
}

/// Ingredient as it arrives from the AI engine, before validation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDraft {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    pub is_present: bool,
}

impl IngredientDraft {
    /// Validate into an `Ingredient`
    pub fn validate(self) -> Result<Ingredient, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyField("ingredient name"));
        }

        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(ValidationError::InvalidQuantity {
                ingredient: name,
                quantity: self.quantity,
            });
        }

        let category = IngredientCategory::parse(&self.category)
            .ok_or_else(|| ValidationError::UnknownCategory(self.category.clone()))?;

        Ok(Ingredient {
            name,
            quantity: self.quantity,
            unit: self.unit.trim().to_string(),
            category,
            is_present: self.is_present,
        })
    }
}
