use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::{api::error, constants::Env};

pub async fn connect_database(env: &Env) -> Result<SqlitePool, error::SystemError> {
    let options = SqliteConnectOptions::from_str(&env.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(env.database_max_connections)
        .min_connections(1)
        .connect_with(options)
        .await?;

    log::info!("Connected to database at {}", env.database_url);
    Ok(pool)
}

/// Single-connection in-memory database. The connection is never recycled,
/// since dropping it drops the database.
pub async fn connect_in_memory() -> Result<SqlitePool, error::SystemError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), error::SystemError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database schema is up to date");
    Ok(())
}
