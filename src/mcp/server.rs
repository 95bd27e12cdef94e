//! Culinary MCP Server Implementation
//!
//! Implements the MCP server with all Culinary tools.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ai::RecipeEngine;
use crate::build_info::BuildInfo;
use crate::db::Database;
use crate::measure::UnitSystem;
use crate::models::{Recipe, User};
use crate::photo;
use crate::session::{ScanStrategy, Session};
use crate::tools::recipes::RecipeSource;
use crate::tools::status::StatusTracker;
use crate::tools::users::PreferenceChanges;
use crate::tools::{backup, favorites, measure, recipes, shopping_list, suggest, users};

/// Culinary MCP Service
#[derive(Clone)]
pub struct CulinaryService {
    status_tracker: Arc<StatusTracker>,
    database: Database,
    engine: Arc<dyn RecipeEngine>,
    session: Arc<Mutex<Session>>,
    tool_router: ToolRouter<CulinaryService>,
}

impl CulinaryService {
    pub fn new(database_path: PathBuf, database: Database, engine: Arc<dyn RecipeEngine>) -> Self {
        Self {
            status_tracker: Arc::new(StatusTracker::new(database_path, engine.engine_name())),
            database,
            engine,
            session: Arc::new(Mutex::new(Session::new())),
            tool_router: Self::tool_router(),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, Session>, McpError> {
        self.session
            .lock()
            .map_err(|_| tool_error("Session state is unavailable"))
    }

    /// Active user id, or an error asking the caller to select one
    fn active_user(&self) -> Result<i64, McpError> {
        self.session()?
            .require_user()
            .map_err(|e| tool_error(e.to_string()))
    }

    fn unit_system(&self, requested: Option<&str>) -> Result<UnitSystem, McpError> {
        match requested {
            Some(label) => UnitSystem::from_str(label).ok_or_else(|| {
                tool_error(format!("Unknown unit system '{}'. Use metric or imperial", label))
            }),
            None => Ok(self.session()?.unit_system()),
        }
    }

    fn currency(&self, user_id: i64) -> Result<String, McpError> {
        let user = users::get_user(&self.database, user_id).map_err(tool_error)?;
        Ok(user
            .map(|u| u.preferences.currency_symbol().to_string())
            .unwrap_or_else(|| crate::models::DEFAULT_CURRENCY.to_string()))
    }

    fn resolve(
        &self,
        index: Option<usize>,
        recipe_id: Option<i64>,
    ) -> Result<(i64, Recipe), McpError> {
        let source = RecipeSource::from_args(index, recipe_id).map_err(tool_error)?;
        let session = self.session()?;
        let user_id = session
            .require_user()
            .map_err(|e| tool_error(e.to_string()))?;
        let recipe = recipes::resolve_recipe(&self.database, &session, user_id, source)
            .map_err(tool_error)?;
        Ok((user_id, recipe))
    }

    /// Store new suggestions and summarize the ones just added
    fn store_suggestions(
        &self,
        recipes: Vec<Recipe>,
        strategy: ScanStrategy,
    ) -> Result<suggest::GenerateResponse, McpError> {
        let added = recipes.len();
        let mut session = self.session()?;
        let total = session.add_suggestions(recipes, strategy);
        Ok(suggest::GenerateResponse {
            added,
            total,
            suggestions: suggest::summarize_from(&session, total - added),
        })
    }
}

fn parse_strategy(strategy: Option<&str>) -> Result<ScanStrategy, McpError> {
    match strategy {
        None => Ok(ScanStrategy::default()),
        Some(label) => ScanStrategy::from_str(label).ok_or_else(|| {
            tool_error(format!("Unknown strategy '{}'. Use replace or append", label))
        }),
    }
}

fn tool_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| tool_error(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(what: &str, id: i64) -> Result<CallToolResult, McpError> {
    json_result(&serde_json::json!({ "error": format!("{} not found", what), "id": id }))
}

// ============================================================================
// Response Structs
// ============================================================================

#[derive(Debug, Serialize)]
struct SelectUserResponse {
    user: User,
    dietary_filters: Vec<String>,
    difficulty_filters: Vec<String>,
    unit_system: UnitSystem,
}

#[derive(Debug, Serialize)]
struct SessionChangeResponse {
    success: bool,
    message: &'static str,
}

// ============================================================================
// Measurement Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FormatQuantityParams {
    /// Decimal quantity, e.g. 1.5
    pub quantity: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertIngredientParams {
    pub name: Option<String>,
    pub quantity: f64,
    /// Unit such as g, kg, ml, l, oz, lb, fl oz, quart, cup, tbsp, tsp
    pub unit: String,
    /// Target system: metric or imperial
    pub unit_system: String,
}

// ============================================================================
// User Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateUserParams {
    pub name: String,
    /// Emoji avatar
    pub avatar: Option<String>,
    pub dark_mode: Option<bool>,
    /// Saved dietary tags, e.g. ["Vegetarian", "Gluten-Free"]
    pub dietary_filters: Option<Vec<String>>,
    /// Saved difficulties: Easy, Medium, Hard
    pub difficulty_filters: Option<Vec<String>>,
    /// Currency symbol for shopping totals (default "$")
    pub currency: Option<String>,
    /// Make the new user active
    #[serde(default)]
    pub select: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateUserParams {
    pub id: i64,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub dark_mode: Option<bool>,
    pub dietary_filters: Option<Vec<String>>,
    pub difficulty_filters: Option<Vec<String>>,
    /// Empty string resets to "$"
    pub currency: Option<String>,
}

// ============================================================================
// Suggestion Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzePhotoParams {
    /// Path to an image file
    pub image_path: Option<String>,
    /// Base64 image data or a data URL
    pub image_base64: Option<String>,
    /// replace (default) or append
    pub strategy: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateRecipesParams {
    /// Ingredient names to cook with
    pub ingredients: Vec<String>,
    /// replace (default) or append
    pub strategy: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StrategyParams {
    /// replace (default) or append
    pub strategy: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetFiltersParams {
    /// Tags every shown recipe must carry; empty list clears
    pub dietary_filters: Option<Vec<String>>,
    /// Allowed difficulties; empty list clears
    pub difficulty_filters: Option<Vec<String>>,
    /// Display units: metric or imperial
    pub unit_system: Option<String>,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeRefParams {
    /// Suggestion index from list_suggestions
    pub index: Option<usize>,
    /// Favorite recipe id
    pub recipe_id: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ViewRecipeParams {
    /// Suggestion index from list_suggestions
    pub index: Option<usize>,
    /// Favorite recipe id
    pub recipe_id: Option<i64>,
    /// Scale to this many servings
    pub servings: Option<u32>,
    /// metric or imperial; defaults to the session setting
    pub unit_system: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteFavoriteParams {
    /// Favorite recipe id to delete
    pub id: i64,
}

// ============================================================================
// Shopping List Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListShoppingListParams {
    /// metric or imperial; defaults to the session setting
    pub unit_system: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddShoppingItemParams {
    pub text: String,
    /// Produce, Dairy, Meat, Seafood, Pantry, Spices, Bakery, Other
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddMissingParams {
    /// Suggestion index from list_suggestions
    pub index: Option<usize>,
    /// Favorite recipe id
    pub recipe_id: Option<i64>,
    /// Scale quantities to this many servings
    pub servings: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateShoppingItemParams {
    pub id: i64,
    pub text: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub price: Option<f64>,
    /// Remove the price
    #[serde(default)]
    pub clear_price: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ShoppingItemIdParams {
    pub id: i64,
}

// ============================================================================
// Backup Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportBackupParams {
    /// Directory to write the backup file into; omit to return the JSON
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportBackupParams {
    /// Backup document as JSON text
    pub json: Option<String>,
    /// Path to a backup file
    pub file_path: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl CulinaryService {
    // --- Status ---

    #[tool(description = "Get the current status of the Culinary service including build info, database status, recipe engine and process information")]
    async fn culinary_status(&self) -> Result<CallToolResult, McpError> {
        let status = self.status_tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| tool_error(format!("Serialization error: {}", e)))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get step-by-step instructions for the Culinary tools. Call this when starting a session or when unsure which tool to use.")]
    fn culinary_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::CULINARY_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(CULINARY_INSTRUCTIONS)]))
    }

    // --- Measurements ---

    #[tool(description = "Format a decimal quantity as a kitchen fraction, e.g. 1.5 -> \"1 1/2\"")]
    fn format_quantity(
        &self,
        Parameters(p): Parameters<FormatQuantityParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = measure::format_quantity_tool(p.quantity).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Convert a quantity and unit to metric or imperial. Unknown units and units already in the target system come back unchanged.")]
    fn convert_ingredient(
        &self,
        Parameters(p): Parameters<ConvertIngredientParams>,
    ) -> Result<CallToolResult, McpError> {
        let target = self.unit_system(Some(p.unit_system.as_str()))?;
        let result = measure::convert_ingredient_tool(p.name, p.quantity, &p.unit, target)
            .map_err(tool_error)?;
        json_result(&result)
    }

    // --- Users ---

    #[tool(description = "Create a user profile with an emoji avatar and optional saved filters and currency")]
    fn create_user(
        &self,
        Parameters(p): Parameters<CreateUserParams>,
    ) -> Result<CallToolResult, McpError> {
        let preferences = PreferenceChanges {
            dark_mode: p.dark_mode,
            dietary_filters: p.dietary_filters,
            difficulty_filters: p.difficulty_filters,
            currency: p.currency,
        }
        .apply(Default::default())
        .map_err(tool_error)?;

        let user = users::create_user(
            &self.database,
            &p.name,
            p.avatar.as_deref(),
            Some(preferences),
        )
        .map_err(tool_error)?;
        if p.select {
            self.session()?.select_user(&user);
        }
        json_result(&user)
    }

    #[tool(description = "List all user profiles")]
    fn list_users(&self) -> Result<CallToolResult, McpError> {
        let result = users::list_users(&self.database).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a user profile by ID")]
    fn get_user(
        &self,
        Parameters(p): Parameters<UserIdParams>,
    ) -> Result<CallToolResult, McpError> {
        match users::get_user(&self.database, p.id).map_err(tool_error)? {
            Some(user) => json_result(&user),
            None => not_found("User", p.id),
        }
    }

    #[tool(description = "Update a user's name, avatar or saved preferences. Only provided fields change.")]
    fn update_user(
        &self,
        Parameters(p): Parameters<UpdateUserParams>,
    ) -> Result<CallToolResult, McpError> {
        let changes = PreferenceChanges {
            dark_mode: p.dark_mode,
            dietary_filters: p.dietary_filters,
            difficulty_filters: p.difficulty_filters,
            currency: p.currency,
        };
        let updated = users::update_user(&self.database, p.id, p.name, p.avatar, changes)
            .map_err(tool_error)?;
        match updated {
            Some(user) => json_result(&user),
            None => not_found("User", p.id),
        }
    }

    #[tool(description = "Delete a user along with all their favorites and shopping list items")]
    fn delete_user(
        &self,
        Parameters(p): Parameters<UserIdParams>,
    ) -> Result<CallToolResult, McpError> {
        match users::delete_user(&self.database, p.id).map_err(tool_error)? {
            Some(result) => {
                self.session()?.forget_user(p.id);
                json_result(&result)
            }
            None => not_found("User", p.id),
        }
    }

    #[tool(description = "Make a user active. Empty session filters are seeded from the user's saved preferences.")]
    fn select_user(
        &self,
        Parameters(p): Parameters<UserIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let Some(user) = users::get_user(&self.database, p.id).map_err(tool_error)? else {
            return not_found("User", p.id);
        };

        let mut session = self.session()?;
        session.select_user(&user);
        info!("Selected user {}", user.id);

        let response = SelectUserResponse {
            dietary_filters: session.dietary_filters().to_vec(),
            difficulty_filters: session
                .difficulty_filters()
                .iter()
                .map(|d| d.as_str().to_string())
                .collect(),
            unit_system: session.unit_system(),
            user,
        };
        json_result(&response)
    }

    #[tool(description = "Sign out the active user and drop the current suggestions")]
    fn logout(&self) -> Result<CallToolResult, McpError> {
        self.session()?.logout();
        json_result(&SessionChangeResponse {
            success: true,
            message: "Logged out",
        })
    }

    // --- Suggestions ---

    #[tool(description = "Suggest 3 recipes from a photo of a fridge or pantry. Give image_path or image_base64. Each recipe gets a generated picture when possible.")]
    async fn analyze_fridge_photo(
        &self,
        Parameters(p): Parameters<AnalyzePhotoParams>,
    ) -> Result<CallToolResult, McpError> {
        let strategy = parse_strategy(p.strategy.as_deref())?;
        let image = match (p.image_path, p.image_base64) {
            (Some(path), None) => photo::prepare_from_path(Path::new(&path)),
            (None, Some(data)) => photo::prepare_from_base64(&data),
            _ => return Err(tool_error("Provide either image_path or image_base64")),
        }
        .map_err(|e| tool_error(e.to_string()))?;

        let recipes = suggest::suggest_from_photo(Arc::clone(&self.engine), &image)
            .await
            .map_err(tool_error)?;
        json_result(&self.store_suggestions(recipes, strategy)?)
    }

    #[tool(description = "Suggest 3 recipes that use the given ingredients")]
    async fn generate_recipes(
        &self,
        Parameters(p): Parameters<GenerateRecipesParams>,
    ) -> Result<CallToolResult, McpError> {
        let strategy = parse_strategy(p.strategy.as_deref())?;
        let recipes = suggest::suggest_from_ingredients(Arc::clone(&self.engine), &p.ingredients)
            .await
            .map_err(tool_error)?;
        json_result(&self.store_suggestions(recipes, strategy)?)
    }

    #[tool(description = "List current suggestions that pass the active dietary and difficulty filters, with their index")]
    fn list_suggestions(&self) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        json_result(&suggest::list_suggestions(&session))
    }

    #[tool(description = "Set the session's dietary filters, difficulty filters and display unit system. Omitted fields keep their value.")]
    fn set_filters(
        &self,
        Parameters(p): Parameters<SetFiltersParams>,
    ) -> Result<CallToolResult, McpError> {
        let difficulties = p
            .difficulty_filters
            .map(|labels| users::parse_difficulties(&labels))
            .transpose()
            .map_err(tool_error)?;
        let system = match p.unit_system.as_deref() {
            Some(label) => Some(self.unit_system(Some(label))?),
            None => None,
        };

        let mut session = self.session()?;
        if let Some(tags) = p.dietary_filters {
            session.set_dietary_filters(users::clean_tags(tags));
        }
        if let Some(difficulties) = difficulties {
            session.set_difficulty_filters(difficulties);
        }
        if let Some(system) = system {
            session.set_unit_system(system);
        }

        let mut listed = serde_json::to_value(suggest::list_suggestions(&session))
            .map_err(|e| tool_error(e.to_string()))?;
        listed["unit_system"] = serde_json::json!(session.unit_system());
        json_result(&listed)
    }

    #[tool(description = "Drop all current suggestions")]
    fn clear_suggestions(&self) -> Result<CallToolResult, McpError> {
        self.session()?.clear_suggestions();
        json_result(&SessionChangeResponse {
            success: true,
            message: "Suggestions cleared",
        })
    }

    // --- Recipes ---

    #[tool(description = "Show a suggestion (by index) or favorite (by recipe_id) scaled to a serving count and converted to metric or imperial units")]
    fn view_recipe(
        &self,
        Parameters(p): Parameters<ViewRecipeParams>,
    ) -> Result<CallToolResult, McpError> {
        let system = self.unit_system(p.unit_system.as_deref())?;
        let (_, recipe) = self.resolve(p.index, p.recipe_id)?;
        let view = recipes::view_recipe(&recipe, p.servings, system).map_err(tool_error)?;
        json_result(&view)
    }

    #[tool(description = "Get a suggestion or favorite as plain text for sharing")]
    fn share_recipe(
        &self,
        Parameters(p): Parameters<RecipeRefParams>,
    ) -> Result<CallToolResult, McpError> {
        let (_, recipe) = self.resolve(p.index, p.recipe_id)?;
        json_result(&recipes::share_recipe(&recipe))
    }

    // --- Favorites ---

    #[tool(description = "List the active user's favorite recipes, newest first")]
    fn list_favorites(&self) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        let result = favorites::list_favorites(&self.database, user_id).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Save a suggestion as favorite, or remove it when a favorite with the same name exists")]
    fn toggle_favorite(
        &self,
        Parameters(p): Parameters<RecipeRefParams>,
    ) -> Result<CallToolResult, McpError> {
        let (user_id, recipe) = self.resolve(p.index, p.recipe_id)?;
        let result =
            favorites::toggle_favorite(&self.database, user_id, &recipe).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete one favorite recipe by ID")]
    fn delete_favorite(
        &self,
        Parameters(p): Parameters<DeleteFavoriteParams>,
    ) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        match favorites::delete_favorite(&self.database, user_id, p.id).map_err(tool_error)? {
            Some(result) => json_result(&result),
            None => not_found("Recipe", p.id),
        }
    }

    #[tool(description = "Delete all of the active user's favorites")]
    fn clear_favorites(&self) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        let result = favorites::clear_favorites(&self.database, user_id).map_err(tool_error)?;
        json_result(&result)
    }

    // --- Shopping List ---

    #[tool(description = "List the active user's shopping list with display quantities and the estimated total")]
    fn list_shopping_list(
        &self,
        Parameters(p): Parameters<ListShoppingListParams>,
    ) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        let system = self.unit_system(p.unit_system.as_deref())?;
        let currency = self.currency(user_id)?;
        let result = shopping_list::list_shopping_list(&self.database, user_id, system, &currency)
            .map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Add an item to the shopping list. Text already on the list returns the existing item.")]
    fn add_shopping_item(
        &self,
        Parameters(p): Parameters<AddShoppingItemParams>,
    ) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        let result = shopping_list::add_shopping_item(
            &self.database,
            user_id,
            &p.text,
            p.category.as_deref(),
            p.quantity,
            p.unit,
            p.price,
        )
        .map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Add every ingredient of a recipe that wasn't seen in the fridge to the shopping list, scaled to servings and converted to the session's unit system")]
    fn add_missing_ingredients(
        &self,
        Parameters(p): Parameters<AddMissingParams>,
    ) -> Result<CallToolResult, McpError> {
        let system = self.unit_system(None)?;
        let (user_id, recipe) = self.resolve(p.index, p.recipe_id)?;
        let result = shopping_list::add_missing_ingredients(
            &self.database,
            user_id,
            &recipe,
            p.servings,
            system,
        )
        .map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Update a shopping item's text, category, quantity, unit or price. Use clear_price to remove the price.")]
    fn update_shopping_item(
        &self,
        Parameters(p): Parameters<UpdateShoppingItemParams>,
    ) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        let result = shopping_list::update_shopping_item(
            &self.database,
            user_id,
            p.id,
            p.text,
            p.category.as_deref(),
            p.quantity,
            p.unit,
            p.price,
            p.clear_price,
        )
        .map_err(tool_error)?;
        match result {
            Some(item) => json_result(&item),
            None => not_found("Shopping item", p.id),
        }
    }

    #[tool(description = "Check or uncheck a shopping item")]
    fn toggle_shopping_item(
        &self,
        Parameters(p): Parameters<ShoppingItemIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        let toggled = shopping_list::toggle_shopping_item(&self.database, user_id, p.id)
            .map_err(tool_error)?;
        match toggled {
            Some(result) => json_result(&result),
            None => not_found("Shopping item", p.id),
        }
    }

    #[tool(description = "Uncheck every item on the shopping list")]
    fn uncheck_all_shopping_items(&self) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        let result = shopping_list::uncheck_all_shopping_items(&self.database, user_id)
            .map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete one shopping item by ID")]
    fn delete_shopping_item(
        &self,
        Parameters(p): Parameters<ShoppingItemIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        let deleted = shopping_list::delete_shopping_item(&self.database, user_id, p.id)
            .map_err(tool_error)?;
        match deleted {
            Some(result) => json_result(&result),
            None => not_found("Shopping item", p.id),
        }
    }

    #[tool(description = "Delete every item on the active user's shopping list")]
    fn clear_shopping_list(&self) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        let result =
            shopping_list::clear_shopping_list(&self.database, user_id).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get the shopping list as plain text grouped by category, with an estimated total when prices are set")]
    fn share_shopping_list(
        &self,
        Parameters(p): Parameters<ListShoppingListParams>,
    ) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        let system = self.unit_system(p.unit_system.as_deref())?;
        let currency = self.currency(user_id)?;
        let result = shopping_list::share_shopping_list(&self.database, user_id, system, &currency)
            .map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Suggest 3 recipes using the items on the active user's shopping list")]
    async fn generate_recipes_from_shopping_list(
        &self,
        Parameters(p): Parameters<StrategyParams>,
    ) -> Result<CallToolResult, McpError> {
        let strategy = parse_strategy(p.strategy.as_deref())?;
        let user_id = self.active_user()?;
        let ingredients = shopping_list::shopping_list_ingredients(&self.database, user_id)
            .map_err(tool_error)?;
        if ingredients.is_empty() {
            return Err(tool_error("The shopping list is empty"));
        }

        let recipes = suggest::suggest_from_ingredients(Arc::clone(&self.engine), &ingredients)
            .await
            .map_err(tool_error)?;
        json_result(&self.store_suggestions(recipes, strategy)?)
    }

    // --- Backup ---

    #[tool(description = "Export the active user's favorites and shopping list as a JSON backup. With output_dir, writes chef-backup-<name>-<date>.json there.")]
    fn export_backup(
        &self,
        Parameters(p): Parameters<ExportBackupParams>,
    ) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        let output_dir = p.output_dir.as_deref().map(Path::new);
        let result =
            backup::export_backup(&self.database, user_id, output_dir).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Merge a backup (JSON text or file path) into the active user. Favorites and items that already exist are skipped.")]
    fn import_backup(
        &self,
        Parameters(p): Parameters<ImportBackupParams>,
    ) -> Result<CallToolResult, McpError> {
        let user_id = self.active_user()?;
        let result = backup::import_backup(
            &self.database,
            user_id,
            p.json.as_deref(),
            p.file_path.as_deref().map(Path::new),
        )
        .map_err(tool_error)?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for CulinaryService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "culinary".into(),
                version: BuildInfo::current().version_label(),
                title: Some("Culinary Assistant".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Culinary Assistant - fridge photo to recipes, favorites and shopping lists. \
                 IMPORTANT: Call culinary_instructions first. \
                 Users: create/list/get/update/delete_user, select_user, logout. \
                 Suggestions: analyze_fridge_photo, generate_recipes, list_suggestions, \
                 set_filters, clear_suggestions. \
                 Recipes: view_recipe (scale + metric/imperial), share_recipe. \
                 Favorites: list_favorites, toggle_favorite, delete_favorite, clear_favorites. \
                 Shopping: list_shopping_list, add_shopping_item, add_missing_ingredients, \
                 update_shopping_item, toggle_shopping_item, uncheck_all_shopping_items, \
                 delete_shopping_item, clear_shopping_list, share_shopping_list, \
                 generate_recipes_from_shopping_list. \
                 Backup: export_backup, import_backup. \
                 Units: format_quantity, convert_ingredient."
                    .into(),
            ),
        }
    }
}
