use sqlx::SqlitePool;
use sqlx_migrator::{Info, Migrate, Migrator, Plan};

/// Implements `sqlx_migrator::Operation` for a unit struct from a pair of
/// sea-query statement builders.
macro_rules! schema_operation {
    ($name:ident, $up:expr, $down:expr) => {
        pub struct $name;

        #[async_trait::async_trait]
        impl sqlx_migrator::Operation<sqlx::Sqlite> for $name {
            async fn up(
                &self,
                connection: &mut sqlx::SqliteConnection,
            ) -> Result<(), sqlx_migrator::Error> {
                let statement = $up.to_string(sea_query::SqliteQueryBuilder);
                sqlx::query(&statement).execute(connection).await?;

                Ok(())
            }

            async fn down(
                &self,
                connection: &mut sqlx::SqliteConnection,
            ) -> Result<(), sqlx_migrator::Error> {
                let statement = $down.to_string(sea_query::SqliteQueryBuilder);
                sqlx::query(&statement).execute(connection).await?;

                Ok(())
            }
        }
    };
}

mod m0001;
pub mod table;

pub fn migrator() -> Result<Migrator<sqlx::Sqlite>, sqlx_migrator::Error> {
    let mut migrator = Migrator::default();
    migrator.add_migrations(vec![Box::new(m0001::Migration)])?;

    Ok(migrator)
}

/// Apply every pending migration on `pool`.
pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    let mut conn = pool.acquire().await?;
    migrator()?.run(&mut conn, &Plan::apply_all()).await?;

    Ok(())
}
