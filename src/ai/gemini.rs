//! Gemini recipe engine
//!
//! Talks to the `generateContent` REST endpoint. Recipe calls ask for JSON
//! constrained by the recipe schema; picture calls go to the image model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use super::schema::{parse_recipes, recipe_response_schema};
use super::{AiError, RecipeEngine, RECIPES_PER_REQUEST};
use crate::config::AiConfig;
use crate::models::{IngredientCategory, Recipe};
use crate::photo::InlineImage;

const IMAGE_ASPECT_RATIO: &str = "16:9";

/// Gemini API engine
#[derive(Debug)]
pub struct GeminiEngine {
    api_key: Option<String>,
    text_model: String,
    image_model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiEngine {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            base_url: config.base_url.clone(),
            client,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        debug!("Calling {} with {} part(s)", model, request.contents[0].parts.len());

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        if status != 200 {
            let error = api_error(status, &body);
            error!("Gemini API error: {}", error);
            return Err(error);
        }

        serde_json::from_str(&body).map_err(|e| AiError::MalformedResponse(e.to_string()))
    }

    async fn recipes(&self, parts: Vec<Part>) -> Result<Vec<Recipe>, AiError> {
        let request = GenerateRequest::recipes(parts);
        let response = self.generate(&self.text_model, &request).await?;
        let text = response.text()?;
        parse_recipes(&text)
    }
}

fn category_list() -> String {
    IngredientCategory::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn image_prompt() -> String {
    format!(
        "You are an expert culinary assistant. Analyze the fridge image and suggest recipes.\n\n\
         Step 1: Identify edible items: produce, dairy, meats, drinks, jars, sauces. Guess if obscured.\n\n\
         Step 2: Generate {} diverse recipes.\n\
         - Default 'servings': 2 or 4.\n\
         - 'category': Must be one of [{}].\n\
         - 'isPresent': true if visible, false otherwise (assume basic pantry staples are true).",
        RECIPES_PER_REQUEST,
        category_list()
    )
}

fn ingredients_prompt(ingredients: &[String]) -> String {
    format!(
        "You are an expert chef. Create {} diverse and delicious recipes using: {}.\n\
         - Assume basic pantry staples exist.\n\
         - 'category': Must be one of [{}].\n\
         - Mark 'isPresent' as true for provided ingredients.",
        RECIPES_PER_REQUEST,
        ingredients.join(", "),
        category_list()
    )
}

fn picture_prompt(name: &str, description: &str) -> String {
    format!(
        "Professional food photography of \"{}\". {}. 4k, appetizing.",
        name, description
    )
}

/// Turn a non-200 reply into an error, using the API's message when present
fn api_error(status: u16, body: &str) -> AiError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| format!("{} {}", e.error.status, e.error.message).trim().to_string())
        .unwrap_or_else(|_| body.to_string());

    if message.contains("SAFETY") {
        return AiError::SafetyBlocked(message);
    }
    AiError::Api { status, message }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: Value,
}

impl GenerateRequest {
    fn recipes(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![RequestContent { parts }],
            generation_config: serde_json::json!({
                "responseMimeType": "application/json",
                "responseSchema": recipe_response_schema(),
            }),
        }
    }

    fn picture(prompt: String) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: serde_json::json!({
                "imageConfig": { "aspectRatio": IMAGE_ASPECT_RATIO },
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineImage>,
}

impl Part {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            ..Default::default()
        }
    }

    fn image(image: &InlineImage) -> Self {
        Self {
            inline_data: Some(image.clone()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GenerateResponse {
    /// Fail if the prompt or the first candidate was blocked
    fn check_blocked(&self) -> Result<(), AiError> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
        {
            return Err(AiError::SafetyBlocked(reason.clone()));
        }
        if let Some(reason) = self.candidates.first().and_then(|c| c.finish_reason.as_ref()) {
            if reason == "SAFETY" || reason == "PROHIBITED_CONTENT" {
                return Err(AiError::SafetyBlocked(reason.clone()));
            }
        }
        Ok(())
    }

    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.iter())
            .into_iter()
            .flatten()
    }

    /// Concatenated text of the first candidate
    fn text(&self) -> Result<String, AiError> {
        self.check_blocked()?;
        let text: String = self.parts().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }

    /// Inline images of the first candidate, as data URLs
    fn image_urls(&self) -> Result<Vec<String>, AiError> {
        self.check_blocked()?;
        Ok(self
            .parts()
            .filter_map(|p| p.inline_data.as_ref())
            .map(InlineImage::to_data_url)
            .collect())
    }
}

#[async_trait]
impl RecipeEngine for GeminiEngine {
    async fn analyze_image(&self, image: &InlineImage) -> Result<Vec<Recipe>, AiError> {
        self.recipes(vec![Part::image(image), Part::text(image_prompt())])
            .await
    }

    async fn generate_from_ingredients(
        &self,
        ingredients: &[String],
    ) -> Result<Vec<Recipe>, AiError> {
        self.recipes(vec![Part::text(ingredients_prompt(ingredients))])
            .await
    }

    async fn generate_image(&self, name: &str, description: &str) -> Result<Vec<String>, AiError> {
        let request = GenerateRequest::picture(picture_prompt(name, description));
        let response = self.generate(&self.image_model, &request).await?;
        response.image_urls()
    }

    fn engine_name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> GenerateResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_recipe_request_shape() {
        let image = InlineImage::jpeg("QUJD".to_string());
        let request = GenerateRequest::recipes(vec![Part::image(&image), Part::text(image_prompt())]);
        let value = serde_json::to_value(&request).unwrap();

        let parts = &value["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "QUJD");
        assert!(parts[0].get("text").is_none());
        assert!(parts[1]["text"].as_str().unwrap().contains("3 diverse recipes"));
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }

    #[test]
    fn test_picture_request_shape() {
        let request = GenerateRequest::picture(picture_prompt("Ramen", "Rich broth"));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["generationConfig"]["imageConfig"]["aspectRatio"], "16:9");
        assert_eq!(
            value["contents"][0]["parts"][0]["text"],
            "Professional food photography of \"Ramen\". Rich broth. 4k, appetizing."
        );
    }

    #[test]
    fn test_ingredients_prompt_lists_inputs() {
        let prompt = ingredients_prompt(&["eggs".to_string(), "spinach".to_string()]);
        assert!(prompt.contains("using: eggs, spinach."));
        assert!(prompt.contains("Produce, Dairy, Meat, Seafood, Pantry, Spices, Bakery, Other"));
    }

    #[test]
    fn test_response_text_and_images() {
        let reply = response(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "[]"},
                    {"inlineData": {"mimeType": "image/png", "data": "iVBO"}}
                ]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(reply.text().unwrap(), "[]");
        assert_eq!(reply.image_urls().unwrap(), vec!["data:image/png;base64,iVBO"]);
    }

    #[test]
    fn test_blocked_responses() {
        let blocked_prompt = response(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        assert!(matches!(blocked_prompt.text(), Err(AiError::SafetyBlocked(_))));

        let blocked_candidate = response(json!({"candidates": [{"finishReason": "SAFETY"}]}));
        assert!(matches!(blocked_candidate.image_urls(), Err(AiError::SafetyBlocked(_))));

        let empty = response(json!({"candidates": []}));
        assert!(matches!(empty.text(), Err(AiError::EmptyResponse)));
        assert!(empty.image_urls().unwrap().is_empty());
    }

    #[test]
    fn test_api_error_parsing() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        match api_error(429, body) {
            AiError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "RESOURCE_EXHAUSTED Quota exceeded");
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(api_error(502, "<html>"), AiError::Api { status: 502, .. }));
        assert!(matches!(
            api_error(400, r#"{"error": {"message": "blocked", "status": "SAFETY"}}"#),
            AiError::SafetyBlocked(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let engine = GeminiEngine::new(&AiConfig::default()).unwrap();
        let result = engine.generate_from_ingredients(&["rice".to_string()]).await;
        assert!(matches!(result, Err(AiError::MissingApiKey)));
    }
}
