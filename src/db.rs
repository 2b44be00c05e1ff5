use crate::errors::RepoError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// The table holding one row per meme.
pub const MEMES_TABLE: &str = "memes";

/// Creates the SQLite connection pool for the given database URL.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, RepoError> {
    tracing::info!(%database_url, "Creating database connection pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Creates the memes table if it does not already exist.
pub async fn initialize_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS memes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            tags TEXT NOT NULL,
            url TEXT NOT NULL,
            width TEXT NOT NULL,
            height TEXT NOT NULL,
            uploaded TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Table '{}' created or already existed.", MEMES_TABLE);
    Ok(())
}

/// Inserts one well-known record when the table is empty at startup.
pub async fn seed_if_empty(pool: &SqlitePool) -> Result<(), RepoError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM memes")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Ok(()); // DB has been seeded
    }

    sqlx::query(
        r#"
        INSERT INTO memes (title, tags, url, width, height, uploaded)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind("Is Mayo an Instrument?")
    .bind("spongebob")
    .bind("https://i.kym-cdn.com/photos/images/original/001/371/723/be6.jpg")
    .bind("768")
    .bind("432")
    .bind("07-10-18 4:20T18:25:43.511Z")
    .execute(pool)
    .await?;

    tracing::info!("Seeded '{}' with one starter record.", MEMES_TABLE);
    Ok(())
}
