use std::ops::Deref;

use time::OffsetDateTime;
use validator::Validate;

use crate::{
    CreateUserInput, Role, UpdateUserInput, User,
    password::{hash_password, verify_password},
    repository::{self, CreateRow, FindType, UpdateRow},
};

#[derive(Clone)]
pub struct Command(pub cookbook_shared::State);

impl Deref for Command {
    type Target = cookbook_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Lowercase the whole address; the identity store treats emails as
/// case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Command {
    pub async fn find(&self, id: impl Into<String>) -> cookbook_shared::Result<Option<User>> {
        repository::find(&self.read_db, FindType::Id(id.into())).await
    }

    pub async fn find_by_email(&self, email: &str) -> cookbook_shared::Result<Option<User>> {
        repository::find(&self.read_db, FindType::Email(normalize_email(email))).await
    }

    pub async fn create_user(&self, input: CreateUserInput) -> cookbook_shared::Result<User> {
        self.create(input, Role::User).await
    }

    /// Same as [`Command::create_user`] with staff and superuser flags set.
    pub async fn create_superuser(&self, input: CreateUserInput) -> cookbook_shared::Result<User> {
        self.create(input, Role::Superuser).await
    }

    #[tracing::instrument(skip_all, fields(role = ?role))]
    async fn create(&self, mut input: CreateUserInput, role: Role) -> cookbook_shared::Result<User> {
        input.email = normalize_email(&input.email);
        if input.email.is_empty() {
            return Err(cookbook_shared::Error::field(
                "email",
                "blank",
                "This field may not be blank.",
            ));
        }

        input.name = input.name.trim().to_owned();
        input.validate()?;

        if self.find_by_email(&input.email).await?.is_some() {
            return Err(email_taken());
        }

        let id = ulid::Ulid::new().to_string();
        let (is_staff, is_superuser) = role.flags();
        let row = CreateRow {
            id: id.to_owned(),
            email: input.email,
            password: hash_password(&input.password)?,
            name: input.name,
            is_staff,
            is_superuser,
            created_at: OffsetDateTime::now_utc().unix_timestamp(),
        };

        if let Err(err) = repository::create(&self.write_db, row).await {
            return Err(match err {
                sqlx::Error::Database(db) if db.is_unique_violation() => email_taken(),
                err => err.into(),
            });
        }

        tracing::info!(user_id = %id, "user created");

        self.find_written(id).await
    }

    /// Check credentials. Only active accounts authenticate; a successful
    /// attempt records `last_login`.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> cookbook_shared::Result<Option<User>> {
        let Some(mut user) =
            repository::find(&self.write_db, FindType::Email(normalize_email(email))).await?
        else {
            return Ok(None);
        };

        if !user.is_active || !self.check_password(&user, password)? {
            tracing::debug!(user_id = %user.id, "authentication rejected");
            return Ok(None);
        }

        let now = OffsetDateTime::now_utc().unix_timestamp();
        repository::update(
            &self.write_db,
            &user.id,
            UpdateRow {
                last_login: Some(now),
                ..Default::default()
            },
        )
        .await?;
        user.last_login = Some(now);

        Ok(Some(user))
    }

    pub fn check_password(&self, user: &User, password: &str) -> cookbook_shared::Result<bool> {
        verify_password(password, &user.password)
    }

    pub async fn update(
        &self,
        id: impl Into<String>,
        mut input: UpdateUserInput,
    ) -> cookbook_shared::Result<User> {
        let id = id.into();
        input.name = input.name.map(|name| name.trim().to_owned());
        input.validate()?;

        if input.name.is_some() || input.password.is_some() {
            let password = match input.password {
                Some(password) => Some(hash_password(&password)?),
                None => None,
            };

            let found = repository::update(
                &self.write_db,
                &id,
                UpdateRow {
                    name: input.name,
                    password,
                    ..Default::default()
                },
            )
            .await?;

            if !found {
                return Err(cookbook_shared::Error::NotFound);
            }
        }

        self.find_written(id).await
    }

    pub async fn set_role(&self, email: &str, role: Role) -> cookbook_shared::Result<User> {
        let Some(user) = self.find_by_email(email).await? else {
            return Err(cookbook_shared::Error::NotFound);
        };

        let (is_staff, is_superuser) = role.flags();
        repository::update(
            &self.write_db,
            &user.id,
            UpdateRow {
                is_staff: Some(is_staff),
                is_superuser: Some(is_superuser),
                ..Default::default()
            },
        )
        .await?;

        tracing::info!(user_id = %user.id, ?role, "user role changed");

        self.find_written(user.id).await
    }

    /// Read back through the write pool so a fresh row is always visible.
    async fn find_written(&self, id: String) -> cookbook_shared::Result<User> {
        repository::find(&self.write_db, FindType::Id(id))
            .await?
            .ok_or(cookbook_shared::Error::NotFound)
    }
}

fn email_taken() -> cookbook_shared::Error {
    cookbook_shared::Error::field("email", "unique", "user with this email already exists.")
}
