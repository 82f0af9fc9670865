use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Argon2 PHC string, never the raw password.
    pub password: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<i64>,
    pub created_at: i64,
}

/// Public representation of an account. The password is write-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.to_owned(),
            name: user.name.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateUserInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 5, message = "Ensure this field has at least 5 characters."))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub name: Option<String>,
    #[validate(length(min = 5, message = "Ensure this field has at least 5 characters."))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Staff,
    Superuser,
}

impl Role {
    pub(crate) fn flags(self) -> (bool, bool) {
        match self {
            Role::User => (false, false),
            Role::Staff => (true, false),
            Role::Superuser => (true, true),
        }
    }
}
