use cookbook_db::table;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::SqlitePool;

use crate::User;

const COLUMNS: [table::User; 9] = [
    table::User::Id,
    table::User::Email,
    table::User::Password,
    table::User::Name,
    table::User::IsActive,
    table::User::IsStaff,
    table::User::IsSuperuser,
    table::User::LastLogin,
    table::User::CreatedAt,
];

pub enum FindType {
    Id(String),
    Email(String),
}

pub(crate) async fn find(
    pool: &SqlitePool,
    arg_type: FindType,
) -> cookbook_shared::Result<Option<User>> {
    let mut statement = Query::select()
        .columns(COLUMNS)
        .from(table::User::Table)
        .limit(1)
        .to_owned();

    match arg_type {
        FindType::Id(id) => statement.and_where(Expr::col(table::User::Id).eq(id)),
        FindType::Email(email) => statement.and_where(Expr::col(table::User::Email).eq(email)),
    };

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, User, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) struct CreateRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: i64,
}

pub(crate) async fn create(pool: &SqlitePool, row: CreateRow) -> Result<(), sqlx::Error> {
    let statement = Query::insert()
        .into_table(table::User::Table)
        .columns([
            table::User::Id,
            table::User::Email,
            table::User::Password,
            table::User::Name,
            table::User::IsActive,
            table::User::IsStaff,
            table::User::IsSuperuser,
            table::User::CreatedAt,
        ])
        .values_panic([
            row.id.into(),
            row.email.into(),
            row.password.into(),
            row.name.into(),
            true.into(),
            row.is_staff.into(),
            row.is_superuser.into(),
            row.created_at.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

#[derive(Default)]
pub(crate) struct UpdateRow {
    pub name: Option<String>,
    pub password: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub last_login: Option<i64>,
}

/// Returns whether a row matched `id`.
pub(crate) async fn update(
    pool: &SqlitePool,
    id: &str,
    row: UpdateRow,
) -> cookbook_shared::Result<bool> {
    let mut statement = Query::update()
        .table(table::User::Table)
        .and_where(Expr::col(table::User::Id).eq(id))
        .to_owned();

    if let Some(name) = row.name {
        statement.value(table::User::Name, name);
    }

    if let Some(password) = row.password {
        statement.value(table::User::Password, password);
    }

    if let Some(is_staff) = row.is_staff {
        statement.value(table::User::IsStaff, is_staff);
    }

    if let Some(is_superuser) = row.is_superuser {
        statement.value(table::User::IsSuperuser, is_superuser);
    }

    if let Some(last_login) = row.last_login {
        statement.value(table::User::LastLogin, last_login);
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}
