mod error;

pub use error::*;

/// Connection pools shared by every store.
///
/// Writes go through `write_db`, which the server caps at a single
/// connection; everything else reads from `read_db`.
#[derive(Clone)]
pub struct State {
    pub read_db: sqlx::SqlitePool,
    pub write_db: sqlx::SqlitePool,
}

impl State {
    pub fn single(pool: sqlx::SqlitePool) -> Self {
        Self {
            read_db: pool.clone(),
            write_db: pool,
        }
    }
}
