use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use validator::ValidationErrors;

/// Errors returned by the JSON API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("authentication credentials were not provided")]
    Unauthenticated,

    #[error("invalid token")]
    InvalidToken,

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Validation failure not tied to a single input field
    pub fn non_field(code: &'static str, message: &'static str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(
            "non_field_errors",
            validator::ValidationError::new(code).with_message(message.into()),
        );

        Self::Validation(errors)
    }
}

impl From<cookbook_shared::Error> for ApiError {
    fn from(value: cookbook_shared::Error) -> Self {
        match value {
            cookbook_shared::Error::Validate(errors) => Self::Validation(errors),
            cookbook_shared::Error::NotFound => Self::NotFound,
            cookbook_shared::Error::Server(msg) => Self::Internal(anyhow::anyhow!(msg)),
            cookbook_shared::Error::Unknown(err) => Self::Internal(err),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

/// `{field: [messages]}`, falling back to the error code when a rule
/// carries no message.
fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|err| {
                    err.message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| err.code.to_string())
                })
                .collect();

            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthenticated => unauthorized("Authentication credentials were not provided."),
            ApiError::InvalidToken => unauthorized("Invalid token."),
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(field_messages(&errors))).into_response()
            }
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
            }
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
            }
            ApiError::Internal(err) => {
                tracing::error!("Internal server error: {err:?}");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "A server error occurred." })),
                )
                    .into_response()
            }
        }
    }
}

fn unauthorized(detail: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
        Json(json!({ "detail": detail })),
    )
        .into_response()
}

/// `axum::Json` with body rejections reported as 400 `{"detail": ...}`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with rejections reported as 400 `{"detail": ...}`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}
