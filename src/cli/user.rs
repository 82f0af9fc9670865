use clap::ValueEnum;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Role {
    User,
    Staff,
    Superuser,
}

impl From<Role> for cookbook_user::Role {
    fn from(value: Role) -> Self {
        match value {
            Role::User => cookbook_user::Role::User,
            Role::Staff => cookbook_user::Role::Staff,
            Role::Superuser => cookbook_user::Role::Superuser,
        }
    }
}

async fn command(config: &cookbook::config::Config) -> anyhow::Result<cookbook_user::Command> {
    let pool = cookbook::create_pool(&config.database.url, 1).await?;
    cookbook_db::migrate(&pool).await?;

    Ok(cookbook_user::Command(cookbook_shared::State::single(pool)))
}

pub async fn create_superuser(
    config: cookbook::config::Config,
    email: String,
    password: String,
    name: String,
) -> anyhow::Result<()> {
    let command = command(&config).await?;

    let user = command
        .create_superuser(cookbook_user::CreateUserInput {
            email,
            password,
            name,
        })
        .await?;

    tracing::info!("superuser {} created", user.email);

    Ok(())
}

pub async fn set_role(
    config: cookbook::config::Config,
    email: String,
    role: Role,
) -> anyhow::Result<()> {
    let command = command(&config).await?;

    let user = match command.set_role(&email, role.into()).await {
        Ok(user) => user,
        Err(cookbook_shared::Error::NotFound) => anyhow::bail!("user {email} not found"),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        "{} now has staff={} superuser={}",
        user.email,
        user.is_staff,
        user.is_superuser
    );

    Ok(())
}
