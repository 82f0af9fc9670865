mod ingredient;
mod recipe;
mod recipe_relation;
mod tag;
mod user;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "cookbook",
    "m0001",
    vec_box![],
    vec_box![
        user::CreateTable,
        user::CreateUk1,
        tag::CreateTable,
        tag::CreateIdx1,
        ingredient::CreateTable,
        ingredient::CreateIdx1,
        recipe::CreateTable,
        recipe::CreateIdx1,
        recipe_relation::CreateRecipeTagTable,
        recipe_relation::CreateRecipeTagIdx1,
        recipe_relation::CreateRecipeIngredientTable,
        recipe_relation::CreateRecipeIngredientIdx1
    ]
);
