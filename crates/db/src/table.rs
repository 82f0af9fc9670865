use sea_query::Iden;

#[derive(Iden, Clone, Copy)]
pub enum User {
    Table,
    Id,
    Email,
    Password,
    Name,
    IsActive,
    IsStaff,
    IsSuperuser,
    LastLogin,
    CreatedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum Tag {
    Table,
    Id,
    UserId,
    Name,
}

#[derive(Iden, Clone, Copy)]
pub enum Ingredient {
    Table,
    Id,
    UserId,
    Name,
}

#[derive(Iden, Clone, Copy)]
pub enum Recipe {
    Table,
    Id,
    UserId,
    Title,
    TimeMinutes,
    Price,
    Link,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum RecipeTag {
    Table,
    RecipeId,
    TagId,
}

#[derive(Iden, Clone, Copy)]
pub enum RecipeIngredient {
    Table,
    RecipeId,
    IngredientId,
}
