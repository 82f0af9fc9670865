use axum::{Extension, extract::State, http::StatusCode};
use cookbook_recipe::{TaxonomyInput, TaxonomyKind, TaxonomyView};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiJson, ApiQuery},
    middleware::Auth,
    routes::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Non-zero keeps only rows attached to a recipe
    #[serde(default)]
    pub assigned_only: u8,
}

/// GET /recipe/tags/
pub async fn list_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<ApiJson<Vec<TaxonomyView>>, ApiError> {
    list(&state, &auth, TaxonomyKind::Tag, query).await
}

/// POST /recipe/tags/
pub async fn create_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    ApiJson(input): ApiJson<TaxonomyInput>,
) -> Result<(StatusCode, ApiJson<TaxonomyView>), ApiError> {
    create(&state, &auth, TaxonomyKind::Tag, input).await
}

/// GET /recipe/ingredients/
pub async fn list_ingredients(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<ApiJson<Vec<TaxonomyView>>, ApiError> {
    list(&state, &auth, TaxonomyKind::Ingredient, query).await
}

/// POST /recipe/ingredients/
pub async fn create_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    ApiJson(input): ApiJson<TaxonomyInput>,
) -> Result<(StatusCode, ApiJson<TaxonomyView>), ApiError> {
    create(&state, &auth, TaxonomyKind::Ingredient, input).await
}

#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user_id))]
async fn list(
    state: &AppState,
    auth: &Auth,
    kind: TaxonomyKind,
    query: ListQuery,
) -> Result<ApiJson<Vec<TaxonomyView>>, ApiError> {
    let items = state
        .recipe_command
        .list_taxonomy(kind, &auth.user_id, query.assigned_only != 0)
        .await?;

    Ok(ApiJson(items))
}

#[tracing::instrument(skip(state, auth, input), fields(user_id = %auth.user_id))]
async fn create(
    state: &AppState,
    auth: &Auth,
    kind: TaxonomyKind,
    input: TaxonomyInput,
) -> Result<(StatusCode, ApiJson<TaxonomyView>), ApiError> {
    let item = state
        .recipe_command
        .create_taxonomy(kind, &auth.user_id, input)
        .await?;

    Ok((StatusCode::CREATED, ApiJson(item)))
}
