use serde::{Deserialize, Serialize};

/// A meme catalog entry, one row in the `memes` table.
///
/// `width`, `height` and `uploaded` are stored as strings; the API performs
/// direct field mapping between payloads and rows, so nothing re-parses them
/// after upload time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemeRecord {
    pub id: i64,
    pub title: String,
    pub tags: String,
    pub url: String,
    pub width: String,
    pub height: String,
    pub uploaded: String,
}

/// Payload for creating a record directly (POST /). The id is assigned by the
/// store; `uploaded` defaults to the server clock when the client omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMeme {
    pub title: String,
    pub tags: String,
    pub url: String,
    pub width: String,
    pub height: String,
    #[serde(default)]
    pub uploaded: Option<String>,
}

/// A parsed multipart upload request. Consumed once to produce a MemeRecord.
#[derive(Debug, Clone)]
pub struct MemeUpload {
    pub title: String,
    pub tags: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}
