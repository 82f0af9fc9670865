use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{error::ApiError, routes::AppState};

/// Auth extension containing the caller extracted from the bearer token
#[derive(Clone, Debug)]
pub struct Auth {
    pub user_id: String,
    pub is_staff: bool,
}

/// Authentication middleware that validates the `Authorization: Bearer` JWT
///
/// Verifies the user still exists and is active, then inserts the
/// [`Auth`] extension. Responds 401 when:
/// - the header is missing or not a bearer token
/// - the token is invalid or expired
/// - the user was deleted or deactivated
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(Authorization(bearer)) = req.headers().typed_get::<Authorization<Bearer>>() else {
        tracing::debug!("Missing bearer token");
        return Err(ApiError::Unauthenticated);
    };

    let claims = match cookbook_user::validate_token(bearer.token(), &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("Invalid JWT token: {e}");
            return Err(ApiError::InvalidToken);
        }
    };

    let user = match state.user_command.find(claims.sub).await? {
        Some(user) if user.is_active => user,
        _ => {
            tracing::warn!("Token user not found or inactive");
            return Err(ApiError::InvalidToken);
        }
    };

    req.extensions_mut().insert(Auth {
        user_id: user.id,
        is_staff: user.is_staff,
    });

    Ok(next.run(req).await)
}
