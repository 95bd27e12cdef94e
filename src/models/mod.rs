//! Data models
//!
//! Rust structs representing stored and exchanged entities.

pub mod backup;
mod ingredient;
pub(crate) mod recipe;
mod shopping_item;
mod user;
mod validation;

pub use backup::{Backup, BackupError, BackupUser, ImportSummary};
pub use ingredient::{Ingredient, IngredientCategory, IngredientDraft};
pub use recipe::{Difficulty, Recipe, RecipeDraft};
pub use shopping_item::{ShoppingListItem, ShoppingListItemCreate, ShoppingListItemUpdate};
pub use user::{User, UserPreferences, UserUpdate, DEFAULT_CURRENCY};
pub use validation::ValidationError;
