use membank_api::{
    aws_clients::{create_s3_client, create_sdk_config},
    config::Config,
    db,
    errors::AppError,
    repositories::SqliteMemeStore,
    routes::create_router,
    service::MemeService,
    startup,
    storage::S3BlobStorage,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "membank_api=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = Config::load()?;
    tracing::info!(?config.bind_address, bucket = %config.bucket_name, "Configuration loaded");

    // --- Blob store client ---
    tracing::info!("Initializing S3 client...");
    let sdk_config = create_sdk_config(&config).await;
    let s3_client = create_s3_client(&sdk_config);

    // --- Record store ---
    let pool = db::create_pool(&config.database_url)
        .await
        .map_err(|e| AppError::InitError(format!("Failed to create database pool: {}", e)))?;

    // --- Resource initialization (table, seed row, bucket) ---
    startup::init_resources(&pool, &s3_client, &config.bucket_name, &config.aws_region).await?;

    // --- Application State ---
    let blob_storage = S3BlobStorage::new(
        s3_client,
        config.bucket_name.clone(),
        config.object_url_base(),
    );
    let service = MemeService::new(
        Arc::new(SqliteMemeStore::new(pool)),
        Arc::new(blob_storage),
    );
    let state = Arc::new(AppState { service });

    // --- Router / Server Startup ---
    let app = create_router(state);

    tracing::info!("Server listening on http://{}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
