use crate::{
    domain::{BlobStore, StoredBlob},
    errors::StorageError,
};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct S3BlobStorage {
    client: S3Client,
    bucket_name: String,
    // Base under which stored objects are publicly addressable, no trailing slash.
    url_base: String,
}

impl S3BlobStorage {
    pub fn new(client: S3Client, bucket_name: String, url_base: String) -> Self {
        Self {
            client,
            bucket_name,
            url_base: url_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStorage {
    /// Uploads the bytes under a fresh UUID key carrying the original
    /// extension, and returns the object's public address.
    async fn store(&self, file_name: &str, bytes: Vec<u8>) -> Result<StoredBlob, StorageError> {
        let key = format!("{}{}", Uuid::new_v4(), file_extension(file_name));

        let content_type = mime_guess::from_path(&key)
            .first_raw()
            .unwrap_or("application/octet-stream");

        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, content_type, "S3: Uploading file");

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .context(format!("S3: Failed to upload object with key '{}'", key))
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        let url = format!("{}/{}", self.url_base, key);
        // An address that does not parse as a URL must never pass for success.
        if self.url_base.is_empty() || url::is_invalid(&url) {
            return Err(StorageError::InvalidAddress(url));
        }

        tracing::debug!(s3_key = %key, %url, "S3: Upload successful");
        Ok(StoredBlob { key, url })
    }
}

/// Extracts the extension (including the leading dot) from a file name.
/// A name without a dot yields the empty string.
pub fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => format!(".{}", ext),
        None => String::new(),
    }
}

// Minimal structural check on the composed address; avoids pulling in a full
// URL parser for what is a scheme + authority sanity test.
mod url {
    pub fn is_invalid(url: &str) -> bool {
        let Some((scheme, rest)) = url.split_once("://") else {
            return true;
        };
        scheme.is_empty() || rest.is_empty() || rest.starts_with('/')
    }
}
