use crate::errors::{RepoError, StorageError};
use crate::models::{MemeRecord, NewMeme};
use async_trait::async_trait;

/// A blob successfully written to object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// The generated object key (UUID plus original extension).
    pub key: String,
    /// Absolute, publicly dereferenceable address of the stored bytes.
    pub url: String,
}

/// Trait defining operations over the meme record table.
#[async_trait]
pub trait MemeStore: Send + Sync + 'static {
    // Send+Sync+'static required for Arc<dyn>

    /// Lists each distinct tag value at most once. Order is unspecified.
    async fn list_tags(&self) -> Result<Vec<String>, RepoError>;

    /// Lists all meme records.
    async fn list_all(&self) -> Result<Vec<MemeRecord>, RepoError>;

    /// Retrieves a record by id. Returns Ok(None) if it does not exist.
    async fn get(&self, id: i64) -> Result<Option<MemeRecord>, RepoError>;

    /// Inserts a new record and returns it with its assigned id.
    async fn create(&self, meme: &NewMeme) -> Result<MemeRecord, RepoError>;

    /// Replaces the full record at `id`. Fails with NotFound if absent.
    async fn update(&self, id: i64, meme: &MemeRecord) -> Result<(), RepoError>;

    /// Removes a record, returning it. Returns Ok(None) if it did not exist.
    async fn delete(&self, id: i64) -> Result<Option<MemeRecord>, RepoError>;

    /// Reports whether a record with `id` exists.
    async fn exists(&self, id: i64) -> Result<bool, RepoError>;
}

/// Trait defining operations for storing raw image bytes.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Uploads `bytes` under a freshly generated key derived from `file_name`
    /// (only its extension is kept). Returns the stored object's address.
    async fn store(&self, file_name: &str, bytes: Vec<u8>) -> Result<StoredBlob, StorageError>;
}
