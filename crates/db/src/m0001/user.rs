use sea_query::{ColumnDef, Table, TableCreateStatement, TableDropStatement};

use crate::table::User;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(User::Table)
        .col(
            ColumnDef::new(User::Id)
                .string()
                .not_null()
                .string_len(26)
                .primary_key(),
        )
        .col(
            ColumnDef::new(User::Email)
                .string()
                .not_null()
                .string_len(255),
        )
        .col(ColumnDef::new(User::Password).string().not_null())
        .col(
            ColumnDef::new(User::Name)
                .string()
                .not_null()
                .string_len(255)
                .default(""),
        )
        .col(
            ColumnDef::new(User::IsActive)
                .boolean()
                .not_null()
                .default(true),
        )
        .col(
            ColumnDef::new(User::IsStaff)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(User::IsSuperuser)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(ColumnDef::new(User::LastLogin).big_integer().null())
        .col(ColumnDef::new(User::CreatedAt).big_integer().not_null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(User::Table).to_owned()
}

schema_operation!(CreateTable, create_table(), drop_table());

pub struct CreateUk1;

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateUk1 {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        // sea-query has no builder for a collated index column
        sqlx::query(r#"CREATE UNIQUE INDEX "uk_user_email" ON "user" ("email" COLLATE NOCASE)"#)
            .execute(connection)
            .await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        sqlx::query(r#"DROP INDEX "uk_user_email""#)
            .execute(connection)
            .await?;

        Ok(())
    }
}
