use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::Client as S3Client;
use serde::Deserialize;

use crate::errors::{AppError, AppResult, ErrorCode};

/// Connection settings for the S3-compatible photo bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_access_key")]
    pub access_key: String,
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

fn default_endpoint() -> String { "http://localhost:9000".to_string() }
fn default_access_key() -> String { "minioadmin".to_string() }
fn default_secret_key() -> String { "minioadmin".to_string() }
fn default_bucket() -> String { "vib3-photos".to_string() }
fn default_public_url() -> String { "http://localhost:9000".to_string() }

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            access_key: default_access_key(),
            secret_key: default_secret_key(),
            bucket: default_bucket(),
            public_url: default_public_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub key: String,
}

#[derive(Clone)]
pub struct MediaStore {
    client: S3Client,
    bucket: String,
    public_url: String,
}

impl MediaStore {
    /// Builds the client without touching the network.
    pub fn new(config: &MediaConfig) -> Self {
        let credentials =
            Credentials::new(&config.access_key, &config.secret_key, None, None, "vib3-media");

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            public_url: config.public_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn ensure_bucket(&self) {
        // The bucket usually exists already; creation failure is not fatal.
        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(_) => tracing::info!(bucket = %self.bucket, "media bucket created"),
            Err(e) => tracing::debug!(bucket = %self.bucket, error = %e, "create_bucket skipped"),
        }
    }

    pub fn public_url_for(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_url, self.bucket, key)
    }

    pub async fn upload(&self, key: &str, body: Vec<u8>, content_type: &str) -> AppResult<StoredObject> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body.into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key, error = %e, "photo upload failed");
                AppError::new(ErrorCode::PhotoUploadFailed, "photo storage is unavailable")
            })?;

        Ok(StoredObject {
            url: self.public_url_for(key),
            key: key.to_string(),
        })
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(key, error = %e, "photo delete failed");
                AppError::new(ErrorCode::ServiceUnavailable, "photo storage is unavailable")
            })?;
        Ok(())
    }
}
