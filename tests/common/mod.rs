#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use cookbook::{
    config::{Config, DatabaseConfig, JwtConfig, ObservabilityConfig, ServerConfig},
    routes::{AppState, router},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test_secret_key_minimum_32_characters_long";

pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();

    cookbook_db::migrate(&pool).await.unwrap();

    pool
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            expiration_days: 1,
        },
        observability: ObservabilityConfig::default(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = setup_test_db().await;
        let store = cookbook_shared::State::single(pool.clone());
        let state = AppState {
            config: test_config(),
            user_command: cookbook_user::Command(store.clone()),
            recipe_command: cookbook_recipe::Command(store),
            pool,
        };

        Self {
            router: router(state.clone()),
            state,
        }
    }

    /// Create an account and return a bearer token for it
    pub async fn login(&self, email: &str) -> String {
        let user = self
            .state
            .user_command
            .create_user(cookbook_user::CreateUserInput {
                email: email.to_owned(),
                password: "testpass123".to_owned(),
                name: "Test".to_owned(),
            })
            .await
            .unwrap();

        cookbook_user::generate_token(&user, JWT_SECRET, 3600).unwrap()
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(token), Some(body)).await
    }
}
