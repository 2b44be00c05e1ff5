use crate::{
    domain::MemeStore,
    errors::RepoError,
    models::{MemeRecord, NewMeme},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SqliteMemeStore {
    pool: SqlitePool,
}

impl SqliteMemeStore {
    /// Creates a new store backed by the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        info!("Initializing SqliteMemeStore");
        Self { pool }
    }
}

#[async_trait]
impl MemeStore for SqliteMemeStore {
    /// Distinct projection over the tags column. Rows keep their free-form
    /// tag strings; deduplication happens only here.
    async fn list_tags(&self) -> Result<Vec<String>, RepoError> {
        let tags = sqlx::query_scalar::<_, String>("SELECT DISTINCT tags FROM memes")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    async fn list_all(&self) -> Result<Vec<MemeRecord>, RepoError> {
        let memes = sqlx::query_as::<_, MemeRecord>("SELECT * FROM memes ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!("Listed {} memes", memes.len());
        Ok(memes)
    }

    async fn get(&self, id: i64) -> Result<Option<MemeRecord>, RepoError> {
        let meme = sqlx::query_as::<_, MemeRecord>("SELECT * FROM memes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(meme)
    }

    /// Inserts the record, letting SQLite assign the id. `uploaded` falls
    /// back to the server clock when the payload omits it.
    async fn create(&self, meme: &NewMeme) -> Result<MemeRecord, RepoError> {
        let uploaded = meme
            .uploaded
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339());

        let created = sqlx::query_as::<_, MemeRecord>(
            r#"
            INSERT INTO memes (title, tags, url, width, height, uploaded)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&meme.title)
        .bind(&meme.tags)
        .bind(&meme.url)
        .bind(&meme.width)
        .bind(&meme.height)
        .bind(&uploaded)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(meme_id = created.id, "Created meme record");
        Ok(created)
    }

    /// Full-row replace. Zero affected rows means the id does not exist.
    async fn update(&self, id: i64, meme: &MemeRecord) -> Result<(), RepoError> {
        let rows = sqlx::query(
            r#"
            UPDATE memes
            SET title = ?, tags = ?, url = ?, width = ?, height = ?, uploaded = ?
            WHERE id = ?
            "#,
        )
        .bind(&meme.title)
        .bind(&meme.tags)
        .bind(&meme.url)
        .bind(&meme.width)
        .bind(&meme.height)
        .bind(&meme.uploaded)
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(RepoError::NotFound(id));
        }

        tracing::debug!(meme_id = id, "Updated meme record");
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<Option<MemeRecord>, RepoError> {
        let removed =
            sqlx::query_as::<_, MemeRecord>("DELETE FROM memes WHERE id = ? RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        if removed.is_some() {
            tracing::debug!(meme_id = id, "Deleted meme record");
        }
        Ok(removed)
    }

    async fn exists(&self, id: i64) -> Result<bool, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM memes WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}
