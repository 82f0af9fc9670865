use std::{collections::HashMap, str::FromStr};

use cookbook_db::table::{Recipe, RecipeIngredient, RecipeTag};
use rust_decimal::Decimal;
use sea_query::{Expr, ExprTrait, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqliteConnection, SqliteExecutor, prelude::FromRow};
use time::OffsetDateTime;
use validator::{Validate, ValidationErrors};

use crate::{
    RecipeDetail, RecipeFilter, RecipeInput, RecipePatch, RecipeSummary, TaxonomyView,
    taxonomy::{self, Ingredients, Tags},
    view,
};

#[derive(Debug, FromRow)]
pub(crate) struct RecipeRow {
    pub id: i64,
    pub title: String,
    pub time_minutes: i64,
    pub price: String,
    pub link: String,
}

impl RecipeRow {
    fn price(&self) -> cookbook_shared::Result<Decimal> {
        match Decimal::from_str(&self.price) {
            Ok(price) => Ok(price),
            Err(err) => {
                cookbook_shared::bail!("recipe {} has an invalid stored price: {err}", self.id)
            }
        }
    }

    fn summary(
        &self,
        tags: &[TaxonomyView],
        ingredients: &[TaxonomyView],
    ) -> cookbook_shared::Result<RecipeSummary> {
        Ok(RecipeSummary {
            id: self.id,
            title: self.title.to_owned(),
            tags: tags.iter().map(|tag| tag.id).collect(),
            time_minutes: self.time_minutes,
            ingredients: ingredients.iter().map(|ingredient| ingredient.id).collect(),
            price: self.price()?,
            link: self.link.to_owned(),
        })
    }
}

const COLUMNS: [(Recipe, Recipe); 5] = [
    (Recipe::Table, Recipe::Id),
    (Recipe::Table, Recipe::Title),
    (Recipe::Table, Recipe::TimeMinutes),
    (Recipe::Table, Recipe::Price),
    (Recipe::Table, Recipe::Link),
];

impl super::Command {
    #[tracing::instrument(skip(self, input))]
    pub async fn create_recipe(
        &self,
        owner: &str,
        input: RecipeInput,
    ) -> cookbook_shared::Result<RecipeSummary> {
        let mut errors = view::collect_errors(input.validate());
        let title = input.title.trim().to_owned();
        if title.is_empty() {
            view::add_error(&mut errors, "title", "blank", view::BLANK);
        }

        if let Some(price) = &input.price {
            view::check_price(price, &mut errors);
        }

        let mut tx = self.write_db.begin().await?;
        let tags =
            taxonomy::check_owned::<Tags>(&mut tx, owner, "tags", &input.tags, &mut errors).await?;
        let ingredients = taxonomy::check_owned::<Ingredients>(
            &mut tx,
            owner,
            "ingredients",
            &input.ingredients,
            &mut errors,
        )
        .await?;

        let (Some(time_minutes), Some(price), true) =
            (input.time_minutes, input.price, errors.is_empty())
        else {
            return Err(errors.into());
        };

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let statement = Query::insert()
            .into_table(Recipe::Table)
            .columns([
                Recipe::UserId,
                Recipe::Title,
                Recipe::TimeMinutes,
                Recipe::Price,
                Recipe::Link,
                Recipe::CreatedAt,
                Recipe::UpdatedAt,
            ])
            .values_panic([
                owner.into(),
                title.to_owned().into(),
                time_minutes.into(),
                view::price_text(&price).into(),
                input.link.unwrap_or_default().into(),
                now.into(),
                now.into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let id = sqlx::query_with(&sql, values)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        taxonomy::replace_links::<Tags>(&mut tx, id, &tags).await?;
        taxonomy::replace_links::<Ingredients>(&mut tx, id, &ingredients).await?;

        let summary = load_summary(&mut tx, owner, id).await?;
        tx.commit().await?;

        tracing::info!(id, "recipe created");

        Ok(summary)
    }

    /// Caller-owned recipes, newest id first. Each non-empty filter keeps
    /// recipes linked to any of its ids.
    pub async fn list_recipes(
        &self,
        owner: &str,
        filter: RecipeFilter,
    ) -> cookbook_shared::Result<Vec<RecipeSummary>> {
        let mut statement = Query::select()
            .columns(COLUMNS)
            .from(Recipe::Table)
            .and_where(Expr::col((Recipe::Table, Recipe::UserId)).eq(owner))
            .order_by((Recipe::Table, Recipe::Id), Order::Desc)
            .to_owned();

        if !filter.tags.is_empty() {
            statement.and_where(
                Expr::col((Recipe::Table, Recipe::Id)).in_subquery(
                    Query::select()
                        .column(RecipeTag::RecipeId)
                        .from(RecipeTag::Table)
                        .and_where(Expr::col(RecipeTag::TagId).is_in(filter.tags))
                        .to_owned(),
                ),
            );
        }

        if !filter.ingredients.is_empty() {
            statement.and_where(
                Expr::col((Recipe::Table, Recipe::Id)).in_subquery(
                    Query::select()
                        .column(RecipeIngredient::RecipeId)
                        .from(RecipeIngredient::Table)
                        .and_where(Expr::col(RecipeIngredient::IngredientId).is_in(filter.ingredients))
                        .to_owned(),
                ),
            );
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, RecipeRow, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        let ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();
        let tags = taxonomy::related::<Tags, _>(&self.read_db, &ids).await?;
        let ingredients = taxonomy::related::<Ingredients, _>(&self.read_db, &ids).await?;

        rows.iter()
            .map(|row| {
                row.summary(
                    relations(&tags, row.id),
                    relations(&ingredients, row.id),
                )
            })
            .collect()
    }

    /// Single recipe with tags and ingredients expanded. Missing and
    /// foreign rows are both not found.
    pub async fn recipe_detail(
        &self,
        owner: &str,
        id: i64,
    ) -> cookbook_shared::Result<RecipeDetail> {
        let row = find_row(&self.read_db, owner, id)
            .await?
            .ok_or(cookbook_shared::Error::NotFound)?;

        let mut tags = taxonomy::related::<Tags, _>(&self.read_db, &[id]).await?;
        let mut ingredients = taxonomy::related::<Ingredients, _>(&self.read_db, &[id]).await?;

        Ok(RecipeDetail {
            id: row.id,
            price: row.price()?,
            title: row.title,
            tags: tags.remove(&id).unwrap_or_default(),
            time_minutes: row.time_minutes,
            ingredients: ingredients.remove(&id).unwrap_or_default(),
            link: row.link,
        })
    }

    /// Apply a full or partial update. Present relation lists replace the
    /// current sets.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_recipe(
        &self,
        owner: &str,
        id: i64,
        patch: RecipePatch,
    ) -> cookbook_shared::Result<RecipeSummary> {
        let mut tx = self.write_db.begin().await?;
        if find_row(&mut *tx, owner, id).await?.is_none() {
            return Err(cookbook_shared::Error::NotFound);
        }

        let mut errors = view::collect_errors(patch.validate());
        let title = patch.title.map(|title| title.trim().to_owned());
        if title.as_deref().is_some_and(str::is_empty) {
            view::add_error(&mut errors, "title", "blank", view::BLANK);
        }

        if let Some(price) = &patch.price {
            view::check_price(price, &mut errors);
        }

        let tags = match &patch.tags {
            Some(ids) => Some(
                taxonomy::check_owned::<Tags>(&mut tx, owner, "tags", ids, &mut errors).await?,
            ),
            None => None,
        };

        let ingredients = match &patch.ingredients {
            Some(ids) => Some(
                taxonomy::check_owned::<Ingredients>(
                    &mut tx,
                    owner,
                    "ingredients",
                    ids,
                    &mut errors,
                )
                .await?,
            ),
            None => None,
        };

        if !errors.is_empty() {
            return Err(errors.into());
        }

        let mut statement = Query::update()
            .table(Recipe::Table)
            .value(
                Recipe::UpdatedAt,
                OffsetDateTime::now_utc().unix_timestamp(),
            )
            .and_where(Expr::col(Recipe::Id).eq(id))
            .and_where(Expr::col(Recipe::UserId).eq(owner))
            .to_owned();

        if let Some(title) = title {
            statement.value(Recipe::Title, title);
        }

        if let Some(time_minutes) = patch.time_minutes {
            statement.value(Recipe::TimeMinutes, time_minutes);
        }

        if let Some(price) = &patch.price {
            statement.value(Recipe::Price, view::price_text(price));
        }

        if let Some(link) = patch.link {
            statement.value(Recipe::Link, link);
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        if let Some(tags) = tags {
            taxonomy::replace_links::<Tags>(&mut tx, id, &tags).await?;
        }

        if let Some(ingredients) = ingredients {
            taxonomy::replace_links::<Ingredients>(&mut tx, id, &ingredients).await?;
        }

        let summary = load_summary(&mut tx, owner, id).await?;
        tx.commit().await?;

        tracing::info!("recipe updated");

        Ok(summary)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_recipe(&self, owner: &str, id: i64) -> cookbook_shared::Result<()> {
        let mut tx = self.write_db.begin().await?;
        if find_row(&mut *tx, owner, id).await?.is_none() {
            return Err(cookbook_shared::Error::NotFound);
        }

        taxonomy::replace_links::<Tags>(&mut tx, id, &[]).await?;
        taxonomy::replace_links::<Ingredients>(&mut tx, id, &[]).await?;

        let statement = Query::delete()
            .from_table(Recipe::Table)
            .and_where(Expr::col(Recipe::Id).eq(id))
            .and_where(Expr::col(Recipe::UserId).eq(owner))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!("recipe deleted");

        Ok(())
    }
}

fn relations(related: &HashMap<i64, Vec<TaxonomyView>>, id: i64) -> &[TaxonomyView] {
    related.get(&id).map(Vec::as_slice).unwrap_or_default()
}

async fn find_row<'e, E: SqliteExecutor<'e>>(
    executor: E,
    owner: &str,
    id: i64,
) -> cookbook_shared::Result<Option<RecipeRow>> {
    let statement = Query::select()
        .columns(COLUMNS)
        .from(Recipe::Table)
        .and_where(Expr::col((Recipe::Table, Recipe::Id)).eq(id))
        .and_where(Expr::col((Recipe::Table, Recipe::UserId)).eq(owner))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, RecipeRow, _>(&sql, values)
        .fetch_optional(executor)
        .await?)
}

async fn load_summary(
    conn: &mut SqliteConnection,
    owner: &str,
    id: i64,
) -> cookbook_shared::Result<RecipeSummary> {
    let row = find_row(&mut *conn, owner, id)
        .await?
        .ok_or(cookbook_shared::Error::NotFound)?;
    let tags = taxonomy::related::<Tags, _>(&mut *conn, &[id]).await?;
    let ingredients = taxonomy::related::<Ingredients, _>(&mut *conn, &[id]).await?;

    row.summary(relations(&tags, id), relations(&ingredients, id))
}

/// Parse a comma separated id list such as `1,2,3`, reporting bad
/// entries against `field`.
pub fn parse_ids(field: &'static str, value: &str) -> Result<Vec<i64>, ValidationErrors> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|_| {
                let mut errors = ValidationErrors::new();
                view::add_error(
                    &mut errors,
                    field,
                    "invalid",
                    format!("\"{part}\" is not a valid integer."),
                );
                errors
            })
        })
        .collect()
}
