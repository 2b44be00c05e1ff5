use std::{env, net::SocketAddr, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
    #[error(transparent)]
    DotEnvError(#[from] dotenvy::Error),
}

#[derive(Clone, Debug)] // Clone needed if passed around, Debug for logging
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub bucket_name: String,
    // Store region as string for simplicity here, aws_clients can convert
    pub aws_region: String,
    // Optional static credential pair; absent means default provider chain
    pub blob_account_name: Option<String>,
    pub blob_account_key: Option<String>,
    // Optional endpoint for LocalStack / S3-compatible stores
    pub endpoint_url: Option<String>,
    // Optional explicit base for public object URLs
    pub public_url_base: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();

        let bind_address_str =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://membank.db?mode=rwc".to_string());

        // The original service pinned all images to one well-known container.
        let bucket_name = env::var("MEME_BUCKET_NAME").unwrap_or_else(|_| "images".to_string());

        let aws_region =
            env::var("AWS_DEFAULT_REGION").unwrap_or_else(|_| "ca-central-1".to_string());

        // Static account name/key pair; both must be present to take effect.
        let blob_account_name = env::var("BLOB_ACCOUNT_NAME").ok();
        let blob_account_key = env::var("BLOB_ACCOUNT_KEY").ok();
        if blob_account_name.is_some() != blob_account_key.is_some() {
            return Err(ConfigError::MissingVar(
                "BLOB_ACCOUNT_NAME and BLOB_ACCOUNT_KEY must be set together".into(),
            ));
        }

        // Allow overriding endpoint for localstack/testing
        let endpoint_url = env::var("AWS_ENDPOINT_URL").ok(); // Optional

        let public_url_base = env::var("PUBLIC_URL_BASE").ok();

        Ok(Config {
            bind_address,
            database_url,
            bucket_name,
            aws_region,
            blob_account_name,
            blob_account_key,
            endpoint_url,
            public_url_base,
        })
    }

    /// The base under which stored objects are publicly addressable.
    ///
    /// Precedence: explicit PUBLIC_URL_BASE, then the endpoint override in
    /// path style, then the standard virtual-hosted S3 form.
    pub fn object_url_base(&self) -> String {
        if let Some(base) = &self.public_url_base {
            return base.trim_end_matches('/').to_string();
        }
        if let Some(endpoint) = &self.endpoint_url {
            return format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket_name);
        }
        format!("https://{}.s3.{}.amazonaws.com", self.bucket_name, self.aws_region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            bind_address: "127.0.0.1:3000".parse().unwrap(),
            database_url: "sqlite::memory:".into(),
            bucket_name: "images".into(),
            aws_region: "ca-central-1".into(),
            blob_account_name: None,
            blob_account_key: None,
            endpoint_url: None,
            public_url_base: None,
        }
    }

    #[test]
    fn object_url_base_defaults_to_virtual_hosted_form() {
        let config = base_config();
        assert_eq!(config.object_url_base(), "https://images.s3.ca-central-1.amazonaws.com");
    }

    #[test]
    fn endpoint_override_uses_path_style() {
        let mut config = base_config();
        config.endpoint_url = Some("http://localhost:4566/".into());
        assert_eq!(config.object_url_base(), "http://localhost:4566/images");
    }

    #[test]
    fn explicit_public_base_wins() {
        let mut config = base_config();
        config.endpoint_url = Some("http://localhost:4566".into());
        config.public_url_base = Some("https://cdn.example.com/memes/".into());
        assert_eq!(config.object_url_base(), "https://cdn.example.com/memes");
    }
}
