//! Recipe engine abstraction
//!
//! A trait over the generative service that turns fridge photos or ingredient
//! lists into recipe suggestions, with a Gemini implementation and a fake for
//! tests and offline use.

mod fake;
mod gemini;
pub mod schema;

pub use fake::FakeEngine;
pub use gemini::GeminiEngine;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AiConfig, AiProvider};
use crate::models::Recipe;
use crate::photo::InlineImage;

/// Number of recipes requested per call
pub const RECIPES_PER_REQUEST: usize = 3;

/// Error type for recipe engine operations
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Missing API Key")]
    MissingApiKey,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Blocked by safety filters: {0}")]
    SafetyBlocked(String),

    #[error("Empty response from AI")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl AiError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            AiError::MissingApiKey => {
                "Missing API Key. Please add your Gemini API Key in the configuration."
            }
            AiError::SafetyBlocked(_) => {
                "The content was flagged by safety filters. Please try a different image."
            }
            AiError::Api { status, message } => classify_status(*status, message),
            _ => GENERIC_FAILURE,
        }
    }
}

const GENERIC_FAILURE: &str = "Failed to generate recipes. Please try again.";

/// Map an HTTP status and error text to a user message
fn classify_status(status: u16, message: &str) -> &'static str {
    let upper = message.to_uppercase();
    if status == 429 || upper.contains("QUOTA") || upper.contains("RESOURCE_EXHAUSTED") {
        "API usage limit exceeded. Please try again later."
    } else if status == 400 || upper.contains("INVALID_ARGUMENT") {
        "The image could not be processed. Please try a different photo."
    } else if (500..600).contains(&status) {
        "Service currently unavailable. Please check your internet connection or try again later."
    } else if upper.contains("SAFETY") {
        "The content was flagged by safety filters. Please try a different image."
    } else {
        GENERIC_FAILURE
    }
}

/// Trait for recipe engines
///
/// Implementations must be thread-safe; the server shares one engine across
/// all requests.
#[async_trait]
pub trait RecipeEngine: Send + Sync + fmt::Debug {
    /// Suggest recipes from a fridge photo
    async fn analyze_image(&self, image: &InlineImage) -> Result<Vec<Recipe>, AiError>;

    /// Suggest recipes that use the given ingredients
    async fn generate_from_ingredients(&self, ingredients: &[String])
        -> Result<Vec<Recipe>, AiError>;

    /// Generate pictures of a dish, as data URLs
    async fn generate_image(&self, name: &str, description: &str) -> Result<Vec<String>, AiError>;

    /// Engine name (e.g., "gemini", "fake")
    fn engine_name(&self) -> &'static str;
}

/// Generate pictures for a recipe, logging and swallowing failures
pub async fn recipe_images(engine: &dyn RecipeEngine, recipe: &Recipe) -> Vec<String> {
    match engine.generate_image(&recipe.name, &recipe.description).await {
        Ok(urls) => urls,
        Err(e) => {
            warn!("Image generation failed for {:?}: {}", recipe.name, e);
            Vec::new()
        }
    }
}

/// Build the engine selected by the configuration
pub fn create_engine(config: &AiConfig) -> Result<Arc<dyn RecipeEngine>, AiError> {
    let engine: Arc<dyn RecipeEngine> = match config.provider {
        AiProvider::Fake => Arc::new(FakeEngine::default()),
        AiProvider::Gemini => {
            if config.api_key.is_none() {
                warn!("No Gemini API key configured; recipe requests will fail until one is set");
            }
            Arc::new(GeminiEngine::new(config)?)
        }
    };
    info!("Recipe engine: {}", engine.engine_name());
    Ok(engine)
}
