use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

// --- Domain/Infrastructure Errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Meme not found with id: {0}")]
    NotFound(i64),

    #[error("Database backend error: {0}")]
    BackendError(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File upload failed: {0}")]
    UploadFailed(String),

    #[error("Stored object has an invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("Storage backend error: {0}")]
    BackendError(#[from] anyhow::Error),
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    // Input validation / request parsing errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Missing form field: {0}")]
    MissingFormField(String),
    #[error("Error processing multipart form data: {0}")]
    MultipartError(#[from] axum::extract::multipart::MultipartError),
    #[error("Could not decode image: {0}")]
    InvalidImage(String),
    #[error("Record id {body} in body does not match id {path} in path")]
    IdMismatch { path: i64, body: i64 },

    // Domain/Service level errors (mapped from RepoError/StorageError)
    #[error("Meme not found with id: {0}")]
    MemeNotFound(i64),
    #[error("Could not store uploaded file")]
    UploadFailed(#[source] StorageError),
    #[error("Could not save meme data")]
    RepositoryError(#[source] RepoError),

    // Configuration / Startup errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Initialization error: {0}")]
    InitError(String),
}

// --- Conversions from Domain Errors to AppError ---

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(id) => AppError::MemeNotFound(id),
            e @ RepoError::BackendError(_) => AppError::RepositoryError(e),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::UploadFailed(err)
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InitError(err.to_string())
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // 4xx Client Errors
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MissingFormField(field) => {
                (StatusCode::BAD_REQUEST, format!("Missing form field: {}", field))
            }
            AppError::MultipartError(e) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid multipart form data: {}", e),
            ),
            AppError::InvalidImage(msg) => {
                (StatusCode::BAD_REQUEST, format!("Could not decode image: {}", msg))
            }
            AppError::IdMismatch { path, body } => (
                StatusCode::BAD_REQUEST,
                format!("Record id {} in body does not match id {} in path", body, path),
            ),
            AppError::MemeNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Meme not found with id: {}", id))
            }
            AppError::UploadFailed(e) => {
                tracing::error!(error.source = ?e, "Blob storage error occurred");
                (
                    StatusCode::BAD_REQUEST,
                    "An error has occured while uploading your file. Please try again.".to_string(),
                )
            }

            // 5xx Server Errors
            AppError::RepositoryError(e) => {
                tracing::error!(error.source = ?e, "Repository error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database operation failed".to_string())
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error".to_string())
            }
            AppError::InitError(msg) => {
                tracing::error!("Initialization error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server initialization error".to_string())
            }
        };

        // Log the specific error variant and message
        tracing::error!(error.message = %error_message, error.detail = %self, "Responding with error");

        let body = Json(serde_json::json!({ "error": error_message }));
        (status, body).into_response()
    }
}
