//! Object storage for product images.
//!
//! The app talks to a single [`ObjectStorage`] handle held in `AppState`.
//! Two backends exist: a directory on local disk (served back at `/media`)
//! and a hosted bucket reached over HTTP.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use axum::http::StatusCode;
use thiserror::Error;

use crate::config::StorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage rejected request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("invalid object key {0:?}")]
    InvalidKey(String),
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
    -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Publicly resolvable URL for `key`.
    fn public_url(&self, key: &str) -> String;

    /// Inverse of [`ObjectStorage::public_url`]; `None` when the URL is not ours.
    fn key_from_url(&self, url: &str) -> Option<String>;
}

pub type SharedStorage = Arc<dyn ObjectStorage>;

pub fn from_config(config: &StorageConfig) -> SharedStorage {
    match config {
        StorageConfig::Local {
            dir,
            public_base_url,
        } => Arc::new(LocalStorage::new(dir.clone(), public_base_url.clone())),
        StorageConfig::Remote {
            url,
            service_key,
            bucket,
        } => Arc::new(RemoteStorage::new(
            url.clone(),
            service_key.clone(),
            bucket.clone(),
        )),
    }
}

/// Object key for a product image: `products/{id}-{millis}-{filename}`.
pub fn product_image_key(product_id: uuid::Uuid, timestamp_millis: i64, filename: &str) -> String {
    let filename = filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("image");
    format!("products/{product_id}-{timestamp_millis}-{filename}")
}

fn encode_key(key: &str) -> String {
    urlencoding::encode(key).replace("%2F", "/")
}

fn check_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|part| part == "..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        check_key(key)?;
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/media/{}", self.public_base_url, encode_key(key))
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        let encoded = url.strip_prefix(&format!("{}/media/", self.public_base_url))?;
        urlencoding::decode(encoded).ok().map(|key| key.into_owned())
    }
}

pub struct RemoteStorage {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl RemoteStorage {
    pub fn new(base_url: String, service_key: String, bucket: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            bucket,
        }
    }

    fn public_prefix(&self) -> String {
        format!("{}/storage/v1/object/public/{}/", self.base_url, self.bucket)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<(), StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Rejected {
        status: StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
        body,
    })
}

#[async_trait]
impl ObjectStorage for RemoteStorage {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        check_key(key)?;
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            encode_key(key)
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        ensure_success(response).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&serde_json::json!({ "prefixes": [key] }))
            .send()
            .await?;
        ensure_success(response).await
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}{}", self.public_prefix(), encode_key(key))
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        let encoded = url.strip_prefix(&self.public_prefix())?;
        urlencoding::decode(encoded).ok().map(|key| key.into_owned())
    }
}
