//! Suggestion MCP Tools
//!
//! Ask the recipe engine for suggestions and summarize what the session holds.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::ai::{recipe_images, AiError, RecipeEngine};
use crate::models::{Difficulty, Recipe};
use crate::photo::InlineImage;
use crate::session::Session;

/// Suggestion summary for listing
#[derive(Debug, Serialize)]
pub struct SuggestionSummary {
    /// Position in the session's suggestion list
    pub index: usize,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub prep_time: u32,
    pub calories: u32,
    pub servings: u32,
    pub dietary_tags: Vec<String>,
    pub missing_ingredients: usize,
    pub image_count: usize,
}

impl SuggestionSummary {
    fn new(index: usize, recipe: &Recipe) -> Self {
        Self {
            index,
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            difficulty: recipe.difficulty,
            prep_time: recipe.prep_time,
            calories: recipe.calories,
            servings: recipe.servings,
            dietary_tags: recipe.dietary_tags.clone(),
            missing_ingredients: recipe.ingredients.iter().filter(|i| !i.is_present).count(),
            image_count: recipe.image_urls.len(),
        }
    }
}

/// Response for list_suggestions
#[derive(Debug, Serialize)]
pub struct ListSuggestionsResponse {
    pub suggestions: Vec<SuggestionSummary>,
    /// Suggestions passing the filters
    pub count: usize,
    /// All suggestions held by the session
    pub total: usize,
    pub dietary_filters: Vec<String>,
    pub difficulty_filters: Vec<Difficulty>,
}

/// Response for tools that produce new suggestions
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub added: usize,
    pub total: usize,
    pub suggestions: Vec<SuggestionSummary>,
}

fn engine_error(e: AiError) -> String {
    warn!("Recipe engine error: {}", e);
    e.user_message().to_string()
}

/// Generate a picture for every recipe concurrently, keeping recipe order
pub async fn attach_images(engine: Arc<dyn RecipeEngine>, recipes: Vec<Recipe>) -> Vec<Recipe> {
    let mut tasks = JoinSet::new();
    for (index, recipe) in recipes.iter().enumerate() {
        let engine = Arc::clone(&engine);
        let recipe = recipe.clone();
        tasks.spawn(async move { (index, recipe_images(engine.as_ref(), &recipe).await) });
    }

    let mut recipes = recipes;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, urls)) => {
                if let Some(recipe) = recipes.get_mut(index) {
                    recipe.image_urls = urls;
                }
            }
            Err(e) => warn!("Image task failed: {}", e),
        }
    }
    recipes
}

/// Suggest recipes from a prepared photo
pub async fn suggest_from_photo(
    engine: Arc<dyn RecipeEngine>,
    image: &InlineImage,
) -> Result<Vec<Recipe>, String> {
    let recipes = engine.analyze_image(image).await.map_err(engine_error)?;
    info!("Engine proposed {} recipes from photo", recipes.len());
    Ok(attach_images(engine, recipes).await)
}

/// Suggest recipes that use the given ingredients
pub async fn suggest_from_ingredients(
    engine: Arc<dyn RecipeEngine>,
    ingredients: &[String],
) -> Result<Vec<Recipe>, String> {
    let ingredients: Vec<String> = ingredients
        .iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();
    if ingredients.is_empty() {
        return Err("Provide at least one ingredient".to_string());
    }

    let recipes = engine
        .generate_from_ingredients(&ingredients)
        .await
        .map_err(engine_error)?;
    info!(
        "Engine proposed {} recipes from {} ingredients",
        recipes.len(),
        ingredients.len()
    );
    Ok(attach_images(engine, recipes).await)
}

/// Summaries of the suggestions in `session` starting at `first_index`
pub fn summarize_from(session: &Session, first_index: usize) -> Vec<SuggestionSummary> {
    session
        .suggestions()
        .iter()
        .enumerate()
        .skip(first_index)
        .map(|(index, recipe)| SuggestionSummary::new(index, recipe))
        .collect()
}

/// Suggestions passing the session's filters
pub fn list_suggestions(session: &Session) -> ListSuggestionsResponse {
    let suggestions: Vec<SuggestionSummary> = session
        .filtered_suggestions()
        .into_iter()
        .map(|(index, recipe)| SuggestionSummary::new(index, recipe))
        .collect();

    ListSuggestionsResponse {
        count: suggestions.len(),
        total: session.suggestions().len(),
        suggestions,
        dietary_filters: session.dietary_filters().to_vec(),
        difficulty_filters: session.difficulty_filters().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FakeEngine;
    use crate::session::ScanStrategy;

    #[tokio::test]
    async fn test_suggest_from_photo_attaches_images_in_order() {
        let engine: Arc<dyn RecipeEngine> = Arc::new(FakeEngine::default());
        let recipes = suggest_from_photo(engine, &InlineImage::jpeg("QUJD".to_string()))
            .await
            .unwrap();

        let names: Vec<_> = recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Tomato Basil Pasta", "Lemon Garlic Salmon", "Chickpea Curry"]);
        assert!(recipes.iter().all(|r| r.image_urls.len() == 1));
    }

    #[tokio::test]
    async fn test_engine_errors_become_user_messages() {
        let engine: Arc<dyn RecipeEngine> = Arc::new(FakeEngine::failing(503));
        let err = suggest_from_ingredients(engine, &["rice".to_string()])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            "Service currently unavailable. Please check your internet connection or try again later."
        );
    }

    #[tokio::test]
    async fn test_blank_ingredients_rejected() {
        let engine: Arc<dyn RecipeEngine> = Arc::new(FakeEngine::default());
        assert!(suggest_from_ingredients(engine, &["  ".to_string()]).await.is_err());
    }

    #[tokio::test]
    async fn test_list_and_summarize() {
        let engine: Arc<dyn RecipeEngine> = Arc::new(FakeEngine::default());
        let recipes = suggest_from_ingredients(engine, &["basil".to_string()])
            .await
            .unwrap();

        let mut session = Session::new();
        session.add_suggestions(recipes.clone(), ScanStrategy::Replace);
        session.add_suggestions(recipes, ScanStrategy::Append);

        let appended = summarize_from(&session, 3);
        assert_eq!(appended.len(), 3);
        assert_eq!(appended[0].index, 3);

        session.set_dietary_filters(vec!["Vegan".to_string()]);
        let listed = list_suggestions(&session);
        assert_eq!(listed.total, 6);
        assert_eq!(listed.count, 2);
        assert!(listed.suggestions.iter().all(|s| s.name == "Chickpea Curry"));
        // Basil was provided, so the pasta misses only the parmesan
        assert_eq!(summarize_from(&session, 0)[0].missing_ingredients, 1);
    }
}
