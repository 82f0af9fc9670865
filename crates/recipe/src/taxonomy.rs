use std::collections::{BTreeSet, HashMap};

use cookbook_db::table;
use sea_query::{Expr, ExprTrait, Iden, JoinType, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqliteConnection, SqliteExecutor, prelude::FromRow};
use validator::Validate;

use crate::{TaxonomyInput, TaxonomyView, view};

/// Tags and ingredients share one shape: an owned, named row attached to
/// recipes through a join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyKind {
    Tag,
    Ingredient,
}

pub(crate) trait TaxonomyTable {
    type Col: Iden + Copy + Send + Sync + 'static;
    type Join: Iden + Copy + Send + Sync + 'static;

    const TABLE: Self::Col;
    const ID: Self::Col;
    const USER_ID: Self::Col;
    const NAME: Self::Col;

    const JOIN_TABLE: Self::Join;
    const JOIN_RECIPE_ID: Self::Join;
    const JOIN_ITEM_ID: Self::Join;
}

pub(crate) struct Tags;

impl TaxonomyTable for Tags {
    type Col = table::Tag;
    type Join = table::RecipeTag;

    const TABLE: table::Tag = table::Tag::Table;
    const ID: table::Tag = table::Tag::Id;
    const USER_ID: table::Tag = table::Tag::UserId;
    const NAME: table::Tag = table::Tag::Name;

    const JOIN_TABLE: table::RecipeTag = table::RecipeTag::Table;
    const JOIN_RECIPE_ID: table::RecipeTag = table::RecipeTag::RecipeId;
    const JOIN_ITEM_ID: table::RecipeTag = table::RecipeTag::TagId;
}

pub(crate) struct Ingredients;

impl TaxonomyTable for Ingredients {
    type Col = table::Ingredient;
    type Join = table::RecipeIngredient;

    const TABLE: table::Ingredient = table::Ingredient::Table;
    const ID: table::Ingredient = table::Ingredient::Id;
    const USER_ID: table::Ingredient = table::Ingredient::UserId;
    const NAME: table::Ingredient = table::Ingredient::Name;

    const JOIN_TABLE: table::RecipeIngredient = table::RecipeIngredient::Table;
    const JOIN_RECIPE_ID: table::RecipeIngredient = table::RecipeIngredient::RecipeId;
    const JOIN_ITEM_ID: table::RecipeIngredient = table::RecipeIngredient::IngredientId;
}

#[derive(FromRow)]
struct RelatedRow {
    recipe_id: i64,
    id: i64,
    name: String,
}

impl super::Command {
    #[tracing::instrument(skip(self, input))]
    pub async fn create_taxonomy(
        &self,
        kind: TaxonomyKind,
        owner: &str,
        input: TaxonomyInput,
    ) -> cookbook_shared::Result<TaxonomyView> {
        match kind {
            TaxonomyKind::Tag => self.create_item::<Tags>(owner, input).await,
            TaxonomyKind::Ingredient => self.create_item::<Ingredients>(owner, input).await,
        }
    }

    /// Caller-owned rows, descending by name. `assigned_only` keeps rows
    /// attached to at least one recipe.
    pub async fn list_taxonomy(
        &self,
        kind: TaxonomyKind,
        owner: &str,
        assigned_only: bool,
    ) -> cookbook_shared::Result<Vec<TaxonomyView>> {
        match kind {
            TaxonomyKind::Tag => list::<Tags>(&self.read_db, owner, assigned_only).await,
            TaxonomyKind::Ingredient => {
                list::<Ingredients>(&self.read_db, owner, assigned_only).await
            }
        }
    }

    async fn create_item<T: TaxonomyTable>(
        &self,
        owner: &str,
        mut input: TaxonomyInput,
    ) -> cookbook_shared::Result<TaxonomyView> {
        input.name = input.name.trim().to_owned();
        if input.name.is_empty() {
            return Err(cookbook_shared::Error::field("name", "blank", view::BLANK));
        }

        input.validate()?;

        let statement = Query::insert()
            .into_table(T::TABLE)
            .columns([T::USER_ID, T::NAME])
            .values_panic([owner.into(), input.name.to_owned().into()])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let result = sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        let id = result.last_insert_rowid();
        tracing::info!(id, "created");

        Ok(TaxonomyView {
            id,
            name: input.name,
        })
    }
}

async fn list<T: TaxonomyTable>(
    pool: &sqlx::SqlitePool,
    owner: &str,
    assigned_only: bool,
) -> cookbook_shared::Result<Vec<TaxonomyView>> {
    let mut statement = Query::select()
        .columns([T::ID, T::NAME])
        .from(T::TABLE)
        .and_where(Expr::col(T::USER_ID).eq(owner))
        .order_by(T::NAME, Order::Desc)
        .order_by(T::ID, Order::Desc)
        .to_owned();

    if assigned_only {
        statement.and_where(
            Expr::col(T::ID).in_subquery(
                Query::select()
                    .column(T::JOIN_ITEM_ID)
                    .from(T::JOIN_TABLE)
                    .to_owned(),
            ),
        );
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, TaxonomyView, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub(crate) async fn find_owned<'e, T: TaxonomyTable, E: SqliteExecutor<'e>>(
    executor: E,
    owner: &str,
    ids: &[i64],
) -> cookbook_shared::Result<Vec<TaxonomyView>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let statement = Query::select()
        .columns([T::ID, T::NAME])
        .from(T::TABLE)
        .and_where(Expr::col(T::USER_ID).eq(owner))
        .and_where(Expr::col(T::ID).is_in(ids.iter().copied()))
        .order_by(T::ID, Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, TaxonomyView, _>(&sql, values)
        .fetch_all(executor)
        .await?)
}

/// Adds an `Invalid pk` error on `field` for every id that is unknown or
/// belongs to someone else. Returns the deduplicated ids.
pub(crate) async fn check_owned<T: TaxonomyTable>(
    conn: &mut SqliteConnection,
    owner: &str,
    field: &'static str,
    ids: &[i64],
    errors: &mut validator::ValidationErrors,
) -> cookbook_shared::Result<Vec<i64>> {
    let ids = ids.iter().copied().collect::<BTreeSet<_>>();
    let ids = ids.into_iter().collect::<Vec<_>>();
    let found = find_owned::<T, _>(&mut *conn, owner, &ids)
        .await?
        .into_iter()
        .map(|item| item.id)
        .collect::<BTreeSet<_>>();

    for id in ids.iter().filter(|id| !found.contains(id)) {
        view::add_error(
            errors,
            field,
            "does_not_exist",
            format!("Invalid pk \"{id}\" - object does not exist."),
        );
    }

    Ok(ids)
}

/// Replace the relation set of `recipe_id` with `ids`.
pub(crate) async fn replace_links<T: TaxonomyTable>(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    ids: &[i64],
) -> cookbook_shared::Result<()> {
    let statement = Query::delete()
        .from_table(T::JOIN_TABLE)
        .and_where(Expr::col(T::JOIN_RECIPE_ID).eq(recipe_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    if ids.is_empty() {
        return Ok(());
    }

    let mut statement = Query::insert()
        .into_table(T::JOIN_TABLE)
        .columns([T::JOIN_RECIPE_ID, T::JOIN_ITEM_ID])
        .to_owned();

    for id in ids {
        statement.values_panic([recipe_id.into(), (*id).into()]);
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

/// Related rows for each recipe, ordered by id.
pub(crate) async fn related<'e, T: TaxonomyTable, E: SqliteExecutor<'e>>(
    executor: E,
    recipe_ids: &[i64],
) -> cookbook_shared::Result<HashMap<i64, Vec<TaxonomyView>>> {
    if recipe_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let statement = Query::select()
        .column((T::JOIN_TABLE, T::JOIN_RECIPE_ID))
        .columns([(T::TABLE, T::ID), (T::TABLE, T::NAME)])
        .from(T::JOIN_TABLE)
        .join(
            JoinType::InnerJoin,
            T::TABLE,
            Expr::col((T::TABLE, T::ID)).equals((T::JOIN_TABLE, T::JOIN_ITEM_ID)),
        )
        .and_where(Expr::col((T::JOIN_TABLE, T::JOIN_RECIPE_ID)).is_in(recipe_ids.iter().copied()))
        .order_by((T::TABLE, T::ID), Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let rows = sqlx::query_as_with::<_, RelatedRow, _>(&sql, values)
        .fetch_all(executor)
        .await?;

    let mut related: HashMap<i64, Vec<TaxonomyView>> = HashMap::new();
    for row in rows {
        related.entry(row.recipe_id).or_default().push(TaxonomyView {
            id: row.id,
            name: row.name,
        });
    }

    Ok(related)
}
