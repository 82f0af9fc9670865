use std::{path::PathBuf, str::FromStr};

use cookbook_shared::State;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<State> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    cookbook_db::migrate(&pool).await?;

    Ok(State::single(pool))
}

pub async fn create_owner(state: &State, email: &str) -> anyhow::Result<String> {
    let user = cookbook_user::Command(state.clone())
        .create_user(cookbook_user::CreateUserInput {
            email: email.to_owned(),
            password: "testpass123".to_owned(),
            name: "Test".to_owned(),
        })
        .await?;

    Ok(user.id)
}
