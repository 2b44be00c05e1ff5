use crate::{
    errors::AppError,
    models::{MemeRecord, MemeUpload, NewMeme},
    AppState,
};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// GET /tags — each distinct tag value at most once.
pub async fn list_tags(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let tags = state.service.list_tags().await?;
    Ok(Json(tags))
}

/// POST /upload — multipart form with `title`, `tags` and an `image` file part.
///
/// A non-multipart request never reaches this body: the extractor rejects it
/// with 400 before either store is touched.
pub async fn upload_meme(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut title = None;
    let mut tags = None;
    let mut image_data: Option<Vec<u8>> = None;
    let mut image_filename: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        match field_name.as_str() {
            "title" => {
                title = Some(field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read title: {}", e))
                })?)
            }
            "tags" => {
                tags = Some(field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read tags: {}", e))
                })?)
            }
            "image" => {
                image_filename = field.file_name().map(|s| s.to_string());
                image_data = Some(field.bytes().await?.to_vec());
            }
            _ => tracing::debug!("Ignoring unknown multipart field: {}", field_name),
        }
    }

    let title = title.ok_or_else(|| AppError::MissingFormField("title".to_string()))?;
    let tags = tags.ok_or_else(|| AppError::MissingFormField("tags".to_string()))?;
    let bytes = image_data.ok_or_else(|| AppError::MissingFormField("image".to_string()))?;

    let record = state
        .service
        .upload(MemeUpload {
            title,
            tags,
            file_name: image_filename.unwrap_or_default(),
            bytes,
        })
        .await?;

    Ok(Json(serde_json::json!({
        "id": record.id,
        "message": format!("File: {} has successfully uploaded", record.title),
    })))
}

/// GET / — all records.
pub async fn list_memes(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let memes = state.service.list_all().await?;
    tracing::debug!("Handler retrieved {} memes", memes.len());
    Ok(Json(memes))
}

/// GET /{id}
pub async fn get_meme(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let meme = state.service.get(id).await?;
    Ok(Json(meme))
}

/// POST / — create a record directly from a JSON body.
pub async fn create_meme(
    State(state): State<Arc<AppState>>,
    Json(new_meme): Json<NewMeme>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.service.create(new_meme).await?;
    let location = format!("/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

/// PUT /{id} — full-record replace; 204 on success.
pub async fn update_meme(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(meme): Json<MemeRecord>,
) -> Result<StatusCode, AppError> {
    state.service.update(id, meme).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /{id} — hard delete; echoes the removed record.
pub async fn delete_meme(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.service.delete(id).await?;
    tracing::info!(meme_id = id, "Meme deleted successfully via handler");
    Ok(Json(removed))
}
