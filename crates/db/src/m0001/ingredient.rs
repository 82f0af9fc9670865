use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Index, IndexCreateStatement, IndexDropStatement,
    Table, TableCreateStatement, TableDropStatement,
};

use crate::table::{Ingredient, User};

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Ingredient::Table)
        .col(
            ColumnDef::new(Ingredient::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Ingredient::UserId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(
            ColumnDef::new(Ingredient::Name)
                .string()
                .not_null()
                .string_len(255),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_ingredient_user")
                .from(Ingredient::Table, Ingredient::UserId)
                .to(User::Table, User::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Ingredient::Table).to_owned()
}

schema_operation!(CreateTable, create_table(), drop_table());

fn create_idx_1() -> IndexCreateStatement {
    Index::create()
        .name("idx_ingredient_user_name")
        .table(Ingredient::Table)
        .col(Ingredient::UserId)
        .col(Ingredient::Name)
        .to_owned()
}

fn drop_idx_1() -> IndexDropStatement {
    Index::drop()
        .name("idx_ingredient_user_name")
        .table(Ingredient::Table)
        .to_owned()
}

schema_operation!(CreateIdx1, create_idx_1(), drop_idx_1());
