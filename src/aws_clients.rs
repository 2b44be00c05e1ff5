use crate::config::Config;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_s3::Client as S3Client;

// Creates the base AWS SDK configuration based on application config.
// Reads region, optional static credentials and optional endpoint URL from
// `Config`. Without a static pair it falls back to the default credential
// provider chain (env vars, profiles, etc.).
pub async fn create_sdk_config(config: &Config) -> SdkConfig {
    let region = Region::new(config.aws_region.clone());
    tracing::info!(sdk_region = %config.aws_region, "Setting SDK region");

    let mut config_loader = aws_config::defaults(BehaviorVersion::latest()).region(region);

    if let (Some(name), Some(key)) = (&config.blob_account_name, &config.blob_account_key) {
        tracing::info!("Using static blob storage credentials from configuration");
        config_loader = config_loader
            .credentials_provider(Credentials::from_keys(name.clone(), key.clone(), None));
    } else {
        tracing::info!("Using default credential resolution.");
    }

    if let Some(endpoint_url) = &config.endpoint_url {
        tracing::info!("Using endpoint override: {}", endpoint_url);
        config_loader = config_loader.endpoint_url(endpoint_url);
    }

    config_loader.load().await
}

// Creates an S3 client from a shared SdkConfig.
pub fn create_s3_client(sdk_config: &SdkConfig) -> S3Client {
    let s3_config_builder = aws_sdk_s3::config::Builder::from(sdk_config).force_path_style(true);
    let s3_config = s3_config_builder.build();
    S3Client::from_conf(s3_config)
}
