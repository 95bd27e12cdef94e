//! Session state
//!
//! What the assistant is currently working with: the signed-in user, the
//! latest recipe suggestions and the active display filters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::measure::UnitSystem;
use crate::models::{Difficulty, Recipe, User};

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("No user selected. Select or create a user first.")]
    NoActiveUser,

    #[error("No suggestion at index {0}")]
    UnknownSuggestion(usize),
}

/// How a new batch of suggestions combines with the current ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStrategy {
    #[default]
    Replace,
    Append,
}

impl ScanStrategy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Some(ScanStrategy::Replace),
            "append" => Some(ScanStrategy::Append),
            _ => None,
        }
    }
}

/// Mutable state of one assistant session
#[derive(Debug, Default)]
pub struct Session {
    user_id: Option<i64>,
    suggestions: Vec<Recipe>,
    dietary_filters: Vec<String>,
    difficulty_filters: Vec<Difficulty>,
    unit_system: UnitSystem,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn require_user(&self) -> Result<i64, SessionError> {
        self.user_id.ok_or(SessionError::NoActiveUser)
    }

    /// Make `user` the active user
    ///
    /// Filters that are currently empty are seeded from the user's saved
    /// preferences.
    pub fn select_user(&mut self, user: &User) {
        self.user_id = Some(user.id);

        let prefs = &user.preferences;
        if self.dietary_filters.is_empty() {
            self.dietary_filters = prefs.dietary_filters.clone();
        }
        if self.difficulty_filters.is_empty() {
            if let Some(saved) = &prefs.difficulty_filters {
                self.difficulty_filters = saved.clone();
            }
        }
    }

    /// Sign out and drop the current suggestions
    pub fn logout(&mut self) {
        self.user_id = None;
        self.suggestions.clear();
    }

    /// Forget the user if it was the one just deleted
    pub fn forget_user(&mut self, user_id: i64) {
        if self.user_id == Some(user_id) {
            self.logout();
        }
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.unit_system
    }

    pub fn set_unit_system(&mut self, system: UnitSystem) {
        self.unit_system = system;
    }

    pub fn dietary_filters(&self) -> &[String] {
        &self.dietary_filters
    }

    pub fn difficulty_filters(&self) -> &[Difficulty] {
        &self.difficulty_filters
    }

    pub fn set_dietary_filters(&mut self, filters: Vec<String>) {
        self.dietary_filters = filters;
    }

    pub fn set_difficulty_filters(&mut self, filters: Vec<Difficulty>) {
        self.difficulty_filters = filters;
    }

    /// Store a new batch of suggestions; returns the new total
    pub fn add_suggestions(&mut self, recipes: Vec<Recipe>, strategy: ScanStrategy) -> usize {
        match strategy {
            ScanStrategy::Replace => self.suggestions = recipes,
            ScanStrategy::Append => self.suggestions.extend(recipes),
        }
        self.suggestions.len()
    }

    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
    }

    pub fn suggestions(&self) -> &[Recipe] {
        &self.suggestions
    }

    pub fn suggestion(&self, index: usize) -> Result<&Recipe, SessionError> {
        self.suggestions
            .get(index)
            .ok_or(SessionError::UnknownSuggestion(index))
    }

    /// Whether a recipe passes the active filters
    ///
    /// Every dietary filter must be among the recipe's tags, and when any
    /// difficulty filters are set the recipe's difficulty must be one of them.
    pub fn matches_filters(&self, recipe: &Recipe) -> bool {
        recipe.has_all_tags(&self.dietary_filters)
            && (self.difficulty_filters.is_empty()
                || self.difficulty_filters.contains(&recipe.difficulty))
    }

    /// Suggestions passing the filters, with their index in the full list
    pub fn filtered_suggestions(&self) -> Vec<(usize, &Recipe)> {
        self.suggestions
            .iter()
            .enumerate()
            .filter(|(_, recipe)| self.matches_filters(recipe))
            .collect()
    }
}
