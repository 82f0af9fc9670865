use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Index, IndexCreateStatement, IndexDropStatement,
    Table, TableCreateStatement, TableDropStatement,
};

use crate::table::{Tag, User};

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Tag::Table)
        .col(
            ColumnDef::new(Tag::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Tag::UserId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(
            ColumnDef::new(Tag::Name)
                .string()
                .not_null()
                .string_len(255),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_tag_user")
                .from(Tag::Table, Tag::UserId)
                .to(User::Table, User::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Tag::Table).to_owned()
}

schema_operation!(CreateTable, create_table(), drop_table());

fn create_idx_1() -> IndexCreateStatement {
    Index::create()
        .name("idx_tag_user_name")
        .table(Tag::Table)
        .col(Tag::UserId)
        .col(Tag::Name)
        .to_owned()
}

fn drop_idx_1() -> IndexDropStatement {
    Index::drop()
        .name("idx_tag_user_name")
        .table(Tag::Table)
        .to_owned()
}

schema_operation!(CreateIdx1, create_idx_1(), drop_idx_1());
