use crate::{
    domain::{BlobStore, MemeStore},
    errors::AppError,
    models::{MemeRecord, MemeUpload, NewMeme},
};
use chrono::Utc;
use image::GenericImageView;
use std::sync::Arc;

/// Orchestrates uploads and CRUD over the record and blob stores.
///
/// Holds no mutable state; both stores are shared handles, so the service is
/// cheap to clone into the application state.
#[derive(Clone)]
pub struct MemeService {
    records: Arc<dyn MemeStore>,
    blobs: Arc<dyn BlobStore>,
}

impl MemeService {
    pub fn new(records: Arc<dyn MemeStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { records, blobs }
    }

    /// Runs the upload sequence: store bytes, probe dimensions, persist record.
    ///
    /// The order is deliberate and strictly sequential with no retries. A
    /// decode or persistence failure after the blob write leaves the stored
    /// object orphaned; the request still fails cleanly.
    pub async fn upload(&self, upload: MemeUpload) -> Result<MemeRecord, AppError> {
        if upload.bytes.is_empty() {
            return Err(AppError::InvalidInput("image data cannot be empty".to_string()));
        }

        let blob = self.blobs.store(&upload.file_name, upload.bytes.clone()).await?;

        let image = image::load_from_memory(&upload.bytes)
            .map_err(|e| AppError::InvalidImage(e.to_string()))?;
        let (width, height) = image.dimensions();

        let draft = NewMeme {
            title: upload.title,
            tags: upload.tags,
            url: blob.url,
            width: width.to_string(),
            height: height.to_string(),
            uploaded: Some(Utc::now().to_rfc3339()),
        };

        let record = self.records.create(&draft).await?;
        tracing::info!(meme_id = record.id, title = %record.title, "Meme uploaded successfully");
        Ok(record)
    }

    pub async fn list_tags(&self) -> Result<Vec<String>, AppError> {
        Ok(self.records.list_tags().await?)
    }

    pub async fn list_all(&self) -> Result<Vec<MemeRecord>, AppError> {
        Ok(self.records.list_all().await?)
    }

    pub async fn get(&self, id: i64) -> Result<MemeRecord, AppError> {
        self.records
            .get(id)
            .await?
            .ok_or(AppError::MemeNotFound(id))
    }

    pub async fn create(&self, meme: NewMeme) -> Result<MemeRecord, AppError> {
        Ok(self.records.create(&meme).await?)
    }

    /// Full-record replace. A path/body id disagreement is rejected before
    /// any store call is made.
    pub async fn update(&self, id: i64, meme: MemeRecord) -> Result<(), AppError> {
        if meme.id != id {
            return Err(AppError::IdMismatch { path: id, body: meme.id });
        }
        if !self.records.exists(id).await? {
            return Err(AppError::MemeNotFound(id));
        }
        self.records.update(id, &meme).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<MemeRecord, AppError> {
        self.records
            .delete(id)
            .await?
            .ok_or(AppError::MemeNotFound(id))
    }
}
