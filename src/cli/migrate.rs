use anyhow::Result;

pub async fn migrate(config: cookbook::config::Config) -> Result<()> {
    tracing::info!("Running database migrations...");

    let pool = cookbook::create_pool(&config.database.url, 1).await?;
    cookbook_db::migrate(&pool).await?;
    pool.close().await;

    tracing::info!("Database migrations completed");

    Ok(())
}
