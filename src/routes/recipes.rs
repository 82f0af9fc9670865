use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use cookbook_recipe::{
    RecipeDetail, RecipeFilter, RecipeInput, RecipePatch, RecipeSummary, parse_ids,
};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiJson, ApiQuery},
    middleware::Auth,
    routes::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Comma separated tag ids
    pub tags: Option<String>,
    /// Comma separated ingredient ids
    pub ingredients: Option<String>,
}

impl ListQuery {
    fn filter(&self) -> Result<RecipeFilter, ApiError> {
        let tags = match &self.tags {
            Some(value) => parse_ids("tags", value)?,
            None => vec![],
        };
        let ingredients = match &self.ingredients {
            Some(value) => parse_ids("ingredients", value)?,
            None => vec![],
        };

        Ok(RecipeFilter { tags, ingredients })
    }
}

/// GET /recipe/recipes/
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<ApiJson<Vec<RecipeSummary>>, ApiError> {
    let recipes = state
        .recipe_command
        .list_recipes(&auth.user_id, query.filter()?)
        .await?;

    Ok(ApiJson(recipes))
}

/// POST /recipe/recipes/
#[tracing::instrument(skip(state, auth, input), fields(user_id = %auth.user_id))]
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    ApiJson(input): ApiJson<RecipeInput>,
) -> Result<(StatusCode, ApiJson<RecipeSummary>), ApiError> {
    let recipe = state
        .recipe_command
        .create_recipe(&auth.user_id, input)
        .await?;

    Ok((StatusCode::CREATED, ApiJson(recipe)))
}

/// GET /recipe/recipes/{id}/
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn detail(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
) -> Result<ApiJson<RecipeDetail>, ApiError> {
    let recipe = state.recipe_command.recipe_detail(&auth.user_id, id).await?;

    Ok(ApiJson(recipe))
}

/// PUT /recipe/recipes/{id}/ - every writable field is required
#[tracing::instrument(skip(state, auth, input), fields(user_id = %auth.user_id))]
pub async fn replace(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
    ApiJson(input): ApiJson<RecipeInput>,
) -> Result<ApiJson<RecipeSummary>, ApiError> {
    let recipe = state
        .recipe_command
        .update_recipe(&auth.user_id, id, RecipePatch::from(input))
        .await?;

    Ok(ApiJson(recipe))
}

/// PATCH /recipe/recipes/{id}/
#[tracing::instrument(skip(state, auth, patch), fields(user_id = %auth.user_id))]
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
    ApiJson(patch): ApiJson<RecipePatch>,
) -> Result<ApiJson<RecipeSummary>, ApiError> {
    let recipe = state
        .recipe_command
        .update_recipe(&auth.user_id, id, patch)
        .await?;

    Ok(ApiJson(recipe))
}

/// DELETE /recipe/recipes/{id}/
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.recipe_command.delete_recipe(&auth.user_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
