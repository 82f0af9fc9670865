use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Index, IndexCreateStatement, IndexDropStatement,
    Table, TableCreateStatement, TableDropStatement,
};

use crate::table::{Ingredient, Recipe, RecipeIngredient, RecipeTag, Tag};

fn create_recipe_tag_table() -> TableCreateStatement {
    Table::create()
        .table(RecipeTag::Table)
        .col(ColumnDef::new(RecipeTag::RecipeId).integer().not_null())
        .col(ColumnDef::new(RecipeTag::TagId).integer().not_null())
        .primary_key(
            Index::create()
                .col(RecipeTag::RecipeId)
                .col(RecipeTag::TagId),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_recipe_tag_recipe")
                .from(RecipeTag::Table, RecipeTag::RecipeId)
                .to(Recipe::Table, Recipe::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_recipe_tag_tag")
                .from(RecipeTag::Table, RecipeTag::TagId)
                .to(Tag::Table, Tag::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_recipe_tag_table() -> TableDropStatement {
    Table::drop().table(RecipeTag::Table).to_owned()
}

schema_operation!(
    CreateRecipeTagTable,
    create_recipe_tag_table(),
    drop_recipe_tag_table()
);

fn create_recipe_tag_idx_1() -> IndexCreateStatement {
    Index::create()
        .name("idx_recipe_tag_tag")
        .table(RecipeTag::Table)
        .col(RecipeTag::TagId)
        .to_owned()
}

fn drop_recipe_tag_idx_1() -> IndexDropStatement {
    Index::drop()
        .name("idx_recipe_tag_tag")
        .table(RecipeTag::Table)
        .to_owned()
}

schema_operation!(
    CreateRecipeTagIdx1,
    create_recipe_tag_idx_1(),
    drop_recipe_tag_idx_1()
);

fn create_recipe_ingredient_table() -> TableCreateStatement {
    Table::create()
        .table(RecipeIngredient::Table)
        .col(
            ColumnDef::new(RecipeIngredient::RecipeId)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(RecipeIngredient::IngredientId)
                .integer()
                .not_null(),
        )
        .primary_key(
            Index::create()
                .col(RecipeIngredient::RecipeId)
                .col(RecipeIngredient::IngredientId),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_recipe_ingredient_recipe")
                .from(RecipeIngredient::Table, RecipeIngredient::RecipeId)
                .to(Recipe::Table, Recipe::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_recipe_ingredient_ingredient")
                .from(RecipeIngredient::Table, RecipeIngredient::IngredientId)
                .to(Ingredient::Table, Ingredient::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_recipe_ingredient_table() -> TableDropStatement {
    Table::drop().table(RecipeIngredient::Table).to_owned()
}

schema_operation!(
    CreateRecipeIngredientTable,
    create_recipe_ingredient_table(),
    drop_recipe_ingredient_table()
);

fn create_recipe_ingredient_idx_1() -> IndexCreateStatement {
    Index::create()
        .name("idx_recipe_ingredient_ingredient")
        .table(RecipeIngredient::Table)
        .col(RecipeIngredient::IngredientId)
        .to_owned()
}

fn drop_recipe_ingredient_idx_1() -> IndexDropStatement {
    Index::drop()
        .name("idx_recipe_ingredient_ingredient")
        .table(RecipeIngredient::Table)
        .to_owned()
}

schema_operation!(
    CreateRecipeIngredientIdx1,
    create_recipe_ingredient_idx_1(),
    drop_recipe_ingredient_idx_1()
);
