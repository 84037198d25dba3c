//! Hosted object storage adapter for certificate artifacts.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use url::Url;

/// Errors that can occur while interacting with the storage backend.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("storage request failed: {0}")]
    Transport(String),
    #[error("storage backend rejected the write: {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("storage backend returned no public URL for `{key}`")]
    MissingUrl { key: String },
    #[error("invalid storage key `{key}`")]
    InvalidKey { key: String },
}

/// Narrow contract over the hosted storage service: durable upsert writes
/// plus public URL resolution. No streaming, no listing.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `key`, replacing any previous object at that key.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str)
    -> Result<(), ObjectStoreError>;

    /// Resolve the publicly addressable URL for `key`. Does not verify that
    /// an object exists there.
    fn public_url(&self, key: &str) -> Result<String, ObjectStoreError>;
}

/// Client for the hosted storage HTTP API. Built once at startup from
/// explicit configuration; holds no ambient global state.
pub struct HostedObjectStore {
    http: reqwest::Client,
    base_url: Url,
    bucket: String,
    service_key: String,
}

impl HostedObjectStore {
    pub fn new(base_url: Url, bucket: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            bucket: bucket.into(),
            service_key: service_key.into(),
        }
    }

    fn object_endpoint(&self, key: &str) -> Result<Url, ObjectStoreError> {
        self.endpoint(&format!("storage/v1/object/{}/{key}", self.bucket), key)
    }

    fn public_endpoint(&self, key: &str) -> Result<Url, ObjectStoreError> {
        self.endpoint(
            &format!("storage/v1/object/public/{}/{key}", self.bucket),
            key,
        )
    }

    fn endpoint(&self, path: &str, key: &str) -> Result<Url, ObjectStoreError> {
        self.base_url
            .join(path)
            .map_err(|_| ObjectStoreError::InvalidKey {
                key: key.to_string(),
            })
    }
}

#[async_trait]
impl ObjectStore for HostedObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let endpoint = self.object_endpoint(key)?;

        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.service_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|err| ObjectStoreError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(ObjectStoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn public_url(&self, key: &str) -> Result<String, ObjectStoreError> {
        let url = self.public_endpoint(key)?;
        let rendered = url.to_string();
        if rendered.is_empty() {
            return Err(ObjectStoreError::MissingUrl {
                key: key.to_string(),
            });
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_embeds_bucket_and_key() {
        let store = HostedObjectStore::new(
            Url::parse("https://project.example.co/").expect("valid url"),
            "assets",
            "service-key",
        );

        let url = store
            .public_url("certificates/E1.pdf")
            .expect("url resolves");
        assert_eq!(
            url,
            "https://project.example.co/storage/v1/object/public/assets/certificates/E1.pdf"
        );
    }
}
