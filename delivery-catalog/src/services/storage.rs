//! Image storage (Cloudinary)
//!
//! Uploads are signed form posts with the image embedded as a base64 data URI.
//! Placeholder images carry a `default_` id and never reach the provider.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

pub const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";
pub const DEFAULT_IMAGE_PREFIX: &str = "default_";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage provider error: {0}")]
    Provider(String),
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        tracing::error!(error = %e, "Image storage failure");
        AppError::with_message(ErrorCode::StorageProviderError, "Image storage failed")
    }
}

/// A stored image
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub url: String,
    pub public_id: String,
}

/// Metadata reported by the provider
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub public_id: String,
    pub url: String,
    pub format: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: Option<u64>,
}

#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        folder: &str,
    ) -> Result<StoredImage, StorageError>;

    /// `true` when the provider confirmed the deletion
    async fn delete(&self, public_id: &str) -> Result<bool, StorageError>;

    async fn info(&self, public_id: &str) -> Result<Option<ImageInfo>, StorageError>;
}

pub fn is_default_image(public_id: &str) -> bool {
    public_id.starts_with(DEFAULT_IMAGE_PREFIX)
}

/// Best-effort removal of a replaced or orphaned image
pub async fn release_image(storage: &dyn ImageStorage, public_id: Option<&str>) {
    let Some(id) = public_id.filter(|id| !id.is_empty() && !is_default_image(id)) else {
        return;
    };
    match storage.delete(id).await {
        Ok(true) => tracing::info!(public_id = %id, "Image deleted"),
        Ok(false) => tracing::warn!(public_id = %id, "Image delete not confirmed"),
        Err(e) => tracing::warn!(public_id = %id, error = %e, "Image delete failed"),
    }
}

/// `{folder}/{yyyyMMdd_HHmmss}_{6 digits}`
pub fn generate_public_id(folder: &str) -> String {
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{folder}/{stamp}_{suffix:06}")
}

/// sha256 hex of `k1=v1&k2=v2...` (keys sorted) followed by the secret
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn data_uri(bytes: &[u8], content_type: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{content_type};base64,{encoded}")
}

pub struct CloudinaryStorage {
    client: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryStorage {
    pub fn new(cloud_name: &str, api_key: &str, api_secret: &str) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: CLOUDINARY_API_BASE.into(),
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{action}", self.api_base, self.cloud_name)
    }

    /// Signed form fields for an upload API call
    fn signed_form(&self, mut params: BTreeMap<&'static str, String>) -> Vec<(&'static str, String)> {
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());
        let signature = sign_params(&params, &self.api_secret);
        let mut form: Vec<(&'static str, String)> = params.into_iter().collect();
        form.push(("api_key", self.api_key.clone()));
        form.push(("signature", signature));
        form.push(("signature_algorithm", "sha256".into()));
        form
    }

    async fn post_form(
        &self,
        action: &str,
        form: &[(&'static str, String)],
    ) -> Result<serde_json::Value, StorageError> {
        let body: serde_json::Value = self
            .client
            .post(self.endpoint(action))
            .form(form)
            .send()
            .await?
            .json()
            .await?;
        if let Some(message) = body.pointer("/error/message").and_then(|m| m.as_str()) {
            return Err(StorageError::Provider(message.to_string()));
        }
        Ok(body)
    }
}

#[async_trait]
impl ImageStorage for CloudinaryStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        folder: &str,
    ) -> Result<StoredImage, StorageError> {
        let public_id = generate_public_id(folder);
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.clone());
        params.insert("overwrite", "false".to_string());
        params.insert("tags", format!("{folder}_image"));

        let mut form = self.signed_form(params);
        form.push(("file", data_uri(&bytes, content_type)));

        let body = self.post_form("upload", &form).await?;
        let url = body["secure_url"]
            .as_str()
            .ok_or_else(|| StorageError::Provider(format!("upload returned no secure_url: {body}")))?;
        let stored = StoredImage {
            url: url.to_string(),
            public_id: body["public_id"].as_str().unwrap_or(&public_id).to_string(),
        };
        tracing::info!(public_id = %stored.public_id, size = bytes.len(), "Image uploaded");
        Ok(stored)
    }

    async fn delete(&self, public_id: &str) -> Result<bool, StorageError> {
        if public_id.trim().is_empty() {
            return Ok(false);
        }
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());
        let form = self.signed_form(params);

        let body = self.post_form("destroy", &form).await?;
        Ok(body["result"].as_str() == Some("ok"))
    }

    async fn info(&self, public_id: &str) -> Result<Option<ImageInfo>, StorageError> {
        let url = format!(
            "{}/{}/resources/image/upload/{public_id}",
            self.api_base, self.cloud_name
        );
        let resp = self
            .client
            .get(url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        Ok(Some(ImageInfo {
            public_id: body["public_id"].as_str().unwrap_or(public_id).to_string(),
            url: body["secure_url"].as_str().unwrap_or_default().to_string(),
            format: body["format"].as_str().map(String::from),
            width: body["width"].as_u64().map(|w| w as u32),
            height: body["height"].as_u64().map(|h| h as u32),
            bytes: body["bytes"].as_u64(),
        }))
    }
}

/// In-memory storage that records every call
#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct RecordingStorage {
        pub uploaded: Mutex<Vec<String>>,
        pub deleted: Mutex<Vec<String>>,
    }

    impl RecordingStorage {
        pub fn deleted(&self) -> Vec<String> {
            self.deleted.lock().unwrap().clone()
        }

        pub fn uploaded(&self) -> Vec<String> {
            self.uploaded.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageStorage for RecordingStorage {
        async fn upload(
            &self,
            _bytes: Vec<u8>,
            _content_type: &str,
            folder: &str,
        ) -> Result<StoredImage, StorageError> {
            let mut uploaded = self.uploaded.lock().unwrap();
            let public_id = format!("{folder}/img_{}", uploaded.len() + 1);
            uploaded.push(public_id.clone());
            Ok(StoredImage {
                url: format!("https://cdn.test/{public_id}.jpg"),
                public_id,
            })
        }

        async fn delete(&self, public_id: &str) -> Result<bool, StorageError> {
            self.deleted.lock().unwrap().push(public_id.to_string());
            Ok(true)
        }

        async fn info(&self, public_id: &str) -> Result<Option<ImageInfo>, StorageError> {
            if !self.uploaded.lock().unwrap().iter().any(|id| id == public_id) {
                return Ok(None);
            }
            Ok(Some(ImageInfo {
                public_id: public_id.to_string(),
                url: format!("https://cdn.test/{public_id}.jpg"),
                format: Some("jpg".into()),
                width: Some(64),
                height: Some(48),
                bytes: Some(1024),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingStorage;
    use super::*;

    #[test]
    fn test_sign_params_sorted_and_salted() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("public_id", "sample".to_string());
        params.insert("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop".to_string());

        let mut hasher = Sha256::new();
        hasher.update(
            b"eager=w_400,h_300,c_pad|w_260,h_200,c_crop&public_id=sample&timestamp=1315060510abcd",
        );
        assert_eq!(sign_params(&params, "abcd"), hex::encode(hasher.finalize()));
    }

    #[test]
    fn test_public_id_format() {
        let id = generate_public_id("products");
        let (folder, rest) = id.split_once('/').unwrap();
        assert_eq!(folder, "products");
        // yyyyMMdd_HHmmss_NNNNNN
        let parts: Vec<&str> = rest.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 6);
        assert!(rest.chars().all(|c| c.is_ascii_digit() || c == '_'));
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(data_uri(b"abc", "image/png"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_default_ids_detected() {
        assert!(is_default_image("default_product_1700000000000"));
        assert!(!is_default_image("products/20240101_120000_000001"));
    }

    #[tokio::test]
    async fn test_release_skips_placeholders() {
        let storage = RecordingStorage::default();
        release_image(&storage, Some("default_store_1_2")).await;
        release_image(&storage, None).await;
        release_image(&storage, Some("")).await;
        release_image(&storage, Some("stores/20240101_000000_123456")).await;
        assert_eq!(storage.deleted(), vec!["stores/20240101_000000_123456".to_string()]);
    }

    #[test]
    fn test_storage_error_maps_to_internal_error() {
        let err = AppError::from(StorageError::Provider("Invalid Signature".into()));
        assert_eq!(err.code, ErrorCode::StorageProviderError);
        assert_eq!(err.http_status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
