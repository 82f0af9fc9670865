mod health;
mod recipes;
mod taxonomy;
mod user;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use sqlx::SqlitePool;

use crate::middleware::auth_middleware;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub user_command: cookbook_user::Command,
    pub recipe_command: cookbook_recipe::Command,
    pub pool: SqlitePool,
}

pub fn router(app_state: AppState) -> Router {
    let recipe = Router::new()
        .route("/tags/", get(taxonomy::list_tags).post(taxonomy::create_tag))
        .route(
            "/ingredients/",
            get(taxonomy::list_ingredients).post(taxonomy::create_ingredient),
        )
        .route("/recipes/", get(recipes::list).post(recipes::create))
        .route(
            "/recipes/{id}/",
            get(recipes::detail)
                .put(recipes::replace)
                .patch(recipes::update)
                .delete(recipes::delete),
        )
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    let account = Router::new()
        .route("/me/", get(user::me).patch(user::update_me))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware))
        .route("/create/", post(user::create))
        .route("/token/", post(user::token));

    Router::new()
        // Health check endpoints (no auth required)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(app_state.pool.clone())
        .nest("/user", account)
        .nest("/recipe", recipe)
        .with_state(app_state)
}
