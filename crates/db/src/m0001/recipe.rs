use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Index, IndexCreateStatement, IndexDropStatement,
    Table, TableCreateStatement, TableDropStatement,
};

use crate::table::{Recipe, User};

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Recipe::Table)
        .col(
            ColumnDef::new(Recipe::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Recipe::UserId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(
            ColumnDef::new(Recipe::Title)
                .string()
                .not_null()
                .string_len(255),
        )
        .col(ColumnDef::new(Recipe::TimeMinutes).integer().not_null())
        // decimal text, two fractional digits
        .col(ColumnDef::new(Recipe::Price).string().not_null())
        .col(
            ColumnDef::new(Recipe::Link)
                .string()
                .not_null()
                .string_len(255)
                .default(""),
        )
        .col(ColumnDef::new(Recipe::CreatedAt).big_integer().not_null())
        .col(ColumnDef::new(Recipe::UpdatedAt).big_integer().null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_recipe_user")
                .from(Recipe::Table, Recipe::UserId)
                .to(User::Table, User::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Recipe::Table).to_owned()
}

schema_operation!(CreateTable, create_table(), drop_table());

fn create_idx_1() -> IndexCreateStatement {
    Index::create()
        .name("idx_recipe_user")
        .table(Recipe::Table)
        .col(Recipe::UserId)
        .to_owned()
}

fn drop_idx_1() -> IndexDropStatement {
    Index::drop()
        .name("idx_recipe_user")
        .table(Recipe::Table)
        .to_owned()
}

schema_operation!(CreateIdx1, create_idx_1(), drop_idx_1());
