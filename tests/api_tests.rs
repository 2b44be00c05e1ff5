use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use membank_api::db;
use membank_api::domain::{BlobStore, StoredBlob};
use membank_api::errors::StorageError;
use membank_api::models::MemeRecord;
use membank_api::repositories::SqliteMemeStore;
use membank_api::routes::create_router;
use membank_api::service::MemeService;
use membank_api::storage::file_extension;
use membank_api::AppState;

// -- Mock blob store ------------------------------------------------------

struct MockBlobStore {
    calls: AtomicUsize,
}

impl MockBlobStore {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn store(&self, file_name: &str, _bytes: Vec<u8>) -> Result<StoredBlob, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = format!("mock-key{}", file_extension(file_name));
        Ok(StoredBlob {
            url: format!("https://blob.example/{}", key),
            key,
        })
    }
}

// -- Helpers --------------------------------------------------------------

async fn build_test_app() -> (Router, Arc<MockBlobStore>, Arc<SqliteMemeStore>) {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    db::initialize_schema(&pool).await.expect("schema");

    let records = Arc::new(SqliteMemeStore::new(pool));
    let blobs = Arc::new(MockBlobStore::new());
    let service = MemeService::new(records.clone(), blobs.clone());
    let app = create_router(Arc::new(AppState { service }));
    (app, blobs, records)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageOutputFormat::Png)
        .expect("encode test png");
    buf.into_inner()
}

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn multipart_upload_request(title: &str, tags: &str, file_bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in [("title", title), ("tags", tags)] {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
             filename=\"meme.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file_bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn sample_meme() -> serde_json::Value {
    serde_json::json!({
        "title": "A",
        "tags": "x",
        "url": "u",
        "width": "1",
        "height": "1"
    })
}

// -- CRUD -----------------------------------------------------------------

#[tokio::test]
async fn post_get_delete_round_trip() {
    let (app, _, _) = build_test_app().await;

    // Create
    let response = app
        .clone()
        .oneshot(json_request("POST", "/", sample_meme()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()
        .unwrap()
        .to_string();
    let created = body_json(response).await;
    let id = created["id"].as_i64().expect("numeric id");
    assert!(id > 0);
    assert_eq!(location, format!("/{}", id));
    assert_eq!(created["title"], "A");

    // Read back
    let response = app
        .clone()
        .oneshot(Request::get(format!("/{}", id)).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched, created);

    // Delete echoes the removed record
    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let removed = body_json(response).await;
    assert_eq!(removed["id"], id);

    // Gone afterwards
    let response = app
        .clone()
        .oneshot(Request::get(format!("/{}", id)).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_missing_id_is_404() {
    let (app, _, _) = build_test_app().await;
    let response = app
        .oneshot(Request::get("/9999").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_of_already_deleted_id_is_404() {
    let (app, _, _) = build_test_app().await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/", sample_meme()))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let del = |id: i64| Request::delete(format!("/{}", id)).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(del(id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(del(id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_returns_all_records() {
    let (app, _, _) = build_test_app().await;

    for title in ["first", "second"] {
        let mut meme = sample_meme();
        meme["title"] = serde_json::json!(title);
        let response = app
            .clone()
            .oneshot(json_request("POST", "/", meme))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let titles: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["first", "second"]);
}

// -- PUT ------------------------------------------------------------------

#[tokio::test]
async fn put_with_mismatched_body_id_is_rejected_without_write() {
    let (app, _, records) = build_test_app().await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/", sample_meme()))
        .await
        .unwrap();
    let created: MemeRecord = serde_json::from_value(body_json(response).await).unwrap();

    let mut body = serde_json::to_value(&created).unwrap();
    body["id"] = serde_json::json!(created.id + 2);
    body["title"] = serde_json::json!("tampered");

    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/{}", created.id), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    use membank_api::domain::MemeStore;
    let unchanged = records.get(created.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "A");
}

#[tokio::test]
async fn put_replaces_record_and_returns_204() {
    let (app, _, _) = build_test_app().await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/", sample_meme()))
        .await
        .unwrap();
    let mut created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    created["title"] = serde_json::json!("renamed");

    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/{}", id), created))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(Request::get(format!("/{}", id)).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let fetched = body_json(response).await;
    assert_eq!(fetched["title"], "renamed");
}

#[tokio::test]
async fn put_on_absent_id_is_404() {
    let (app, _, _) = build_test_app().await;

    let mut body = sample_meme();
    body["id"] = serde_json::json!(4242);
    body["uploaded"] = serde_json::json!("now");

    let response = app
        .oneshot(json_request("PUT", "/4242", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Tags -----------------------------------------------------------------

#[tokio::test]
async fn tags_are_listed_at_most_once() {
    let (app, _, _) = build_test_app().await;

    for tags in ["spongebob", "spongebob", "cats"] {
        let mut meme = sample_meme();
        meme["tags"] = serde_json::json!(tags);
        app.clone()
            .oneshot(json_request("POST", "/", meme))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(Request::get("/tags").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mut tags: Vec<String> =
        serde_json::from_value(body_json(response).await).expect("tag array");
    tags.sort();
    assert_eq!(tags, vec!["cats".to_string(), "spongebob".to_string()]);
}

// -- Upload ---------------------------------------------------------------

#[tokio::test]
async fn upload_stores_blob_and_record_with_true_dimensions() {
    let (app, blobs, records) = build_test_app().await;

    let response = app
        .clone()
        .oneshot(multipart_upload_request("mayo", "spongebob", &png_bytes(64, 27)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let id = body["id"].as_i64().expect("created id");
    assert_eq!(body["message"], "File: mayo has successfully uploaded");
    assert_eq!(blobs.call_count(), 1);

    use membank_api::domain::MemeStore;
    let record = records.get(id).await.unwrap().expect("persisted record");
    assert_eq!(record.width, "64");
    assert_eq!(record.height, "27");
    assert_eq!(record.tags, "spongebob");
    assert_eq!(record.url, "https://blob.example/mock-key.png");
    assert!(!record.uploaded.is_empty());
}

#[tokio::test]
async fn non_multipart_upload_is_rejected_before_any_store_call() {
    let (app, blobs, records) = build_test_app().await;

    let response = app
        .oneshot(json_request("POST", "/upload", serde_json::json!({"title": "x"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(blobs.call_count(), 0);

    use membank_api::domain::MemeStore;
    assert!(records.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_with_undecodable_image_fails_after_blob_store() {
    let (app, blobs, records) = build_test_app().await;

    let response = app
        .oneshot(multipart_upload_request("broken", "x", b"not an image at all"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Blob was stored (accepted orphan), record was not persisted.
    assert_eq!(blobs.call_count(), 1);
    use membank_api::domain::MemeStore;
    assert!(records.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_without_image_field_is_400() {
    let (app, blobs, _) = build_test_app().await;

    let mut body = Vec::new();
    body.extend_from_slice(
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nx\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"tags\"\r\n\r\ny\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(blobs.call_count(), 0);
}
