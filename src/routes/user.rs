use axum::{Extension, extract::State, http::StatusCode};
use cookbook_user::{CreateUserInput, UpdateUserInput, UserView};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::{ApiError, ApiJson},
    middleware::Auth,
    routes::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct TokenInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Address format is only enforced on public signup; the store accepts any
/// non-blank login.
#[derive(Debug, Validate)]
struct SignupEmail {
    #[validate(email(message = "Enter a valid email address."))]
    email: String,
}

/// POST /user/create/
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateUserInput>,
) -> Result<(StatusCode, ApiJson<UserView>), ApiError> {
    let email = input.email.trim();
    if !email.is_empty() {
        SignupEmail {
            email: email.to_owned(),
        }
        .validate()?;
    }

    let user = state.user_command.create_user(input).await?;

    Ok((StatusCode::CREATED, ApiJson(UserView::from(&user))))
}

/// POST /user/token/ - exchange credentials for a bearer token
#[tracing::instrument(skip_all)]
pub async fn token(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TokenInput>,
) -> Result<ApiJson<TokenResponse>, ApiError> {
    let mut errors = validator::ValidationErrors::new();
    for (field, value) in [("email", &input.email), ("password", &input.password)] {
        if value.trim().is_empty() {
            errors.add(
                field,
                validator::ValidationError::new("blank")
                    .with_message("This field may not be blank.".into()),
            );
        }
    }

    if !errors.is_empty() {
        return Err(errors.into());
    }

    let Some(user) = state
        .user_command
        .authenticate(&input.email, &input.password)
        .await?
    else {
        return Err(ApiError::non_field(
            "authorization",
            "Unable to authenticate with provided credentials",
        ));
    };

    let token = cookbook_user::generate_token(
        &user,
        &state.config.jwt.secret,
        state.config.jwt.lifetime_seconds(),
    )?;

    tracing::info!(user_id = %user.id, "token issued");

    Ok(ApiJson(TokenResponse { token }))
}

/// GET /user/me/
#[tracing::instrument(skip_all, fields(user_id = %auth.user_id))]
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> Result<ApiJson<UserView>, ApiError> {
    let user = state
        .user_command
        .find(auth.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(ApiJson(UserView::from(&user)))
}

/// PATCH /user/me/
#[tracing::instrument(skip_all, fields(user_id = %auth.user_id))]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    ApiJson(input): ApiJson<UpdateUserInput>,
) -> Result<ApiJson<UserView>, ApiError> {
    let user = state.user_command.update(auth.user_id, input).await?;

    Ok(ApiJson(UserView::from(&user)))
}
