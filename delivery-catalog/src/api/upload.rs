//! Multipart request bodies: a `data` JSON part plus an optional image part
//!
//! The image is normalized by [`ImageConverter`](crate::services::ImageConverter)
//! on the blocking pool, then handed to the image storage.

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use serde::de::DeserializeOwned;
use shared::error::{AppError, ErrorCode};

use crate::api::internal;
use crate::services::storage::release_image;
use crate::services::{ImageStorage, StoredImage};
use crate::state::AppState;

const DATA_FIELD: &str = "data";
const IMAGE_FIELDS: &[&str] = &["image", "file"];

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: String,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub data: Option<Vec<u8>>,
    pub image: Option<UploadedFile>,
}

impl MultipartForm {
    /// Deserialize the `data` part
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        let data = self.data.as_deref().ok_or_else(|| {
            AppError::with_message(ErrorCode::RequiredField, "Missing 'data' part")
                .with_detail("field", DATA_FIELD)
        })?;
        serde_json::from_slice(data).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid 'data' JSON: {e}"))
                .with_detail("field", DATA_FIELD)
        })
    }

    pub fn require_image(&mut self, message: &str) -> Result<UploadedFile, AppError> {
        self.image
            .take()
            .ok_or_else(|| AppError::with_message(ErrorCode::ProductImageRequired, message))
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == http::StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::with_message(ErrorCode::FileTooLarge, e.body_text());
    }
    AppError::with_message(ErrorCode::InvalidRequest, format!("Multipart error: {}", e.body_text()))
}

pub async fn read_form(mut multipart: Multipart, max_file_size: usize) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == DATA_FIELD {
            form.data = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
        } else if IMAGE_FIELDS.contains(&name.as_str()) {
            let file_name = field.file_name().map(String::from);
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;

            // Browsers send an empty part when no file was picked
            if bytes.is_empty() {
                if file_name.as_deref().is_some_and(|n| !n.is_empty()) {
                    return Err(AppError::new(ErrorCode::EmptyFile).with_detail("field", name));
                }
                continue;
            }
            if bytes.len() > max_file_size {
                return Err(AppError::with_message(
                    ErrorCode::FileTooLarge,
                    format!(
                        "File too large: {} bytes (max {} bytes)",
                        bytes.len(),
                        max_file_size
                    ),
                ));
            }
            form.image = Some(UploadedFile {
                bytes: bytes.to_vec(),
                file_name,
                content_type,
            });
        } else {
            tracing::debug!(field = %name, "Ignoring unknown multipart field");
        }
    }

    Ok(form)
}

/// Convert and upload an image into `folder`
pub async fn store_image(
    state: &AppState,
    file: UploadedFile,
    folder: &str,
) -> Result<StoredImage, AppError> {
    let converter = state.converter;
    let processed = tokio::task::spawn_blocking(move || {
        converter.process(&file.bytes, file.file_name.as_deref(), &file.content_type)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Image conversion task failed");
        AppError::new(ErrorCode::ImageProcessingFailed)
    })??;
    tracing::debug!(
        original = ?processed.original_file_name,
        original_type = %processed.original_content_type,
        file_name = %processed.file_name,
        extension = %processed.extension,
        size = processed.bytes.len(),
        "Image prepared for upload"
    );

    let stored = state
        .storage
        .upload(processed.bytes, &processed.content_type, folder)
        .await?;
    Ok(stored)
}

/// Settle the images around a row write.
///
/// A successful write drops `replaced`; a failed one drops `stored`, the image
/// uploaded for this request, so neither outlives its row.
pub async fn settle_image_write<T, E: std::fmt::Display>(
    storage: &dyn ImageStorage,
    written: Result<T, E>,
    stored: Option<&str>,
    replaced: Option<&str>,
) -> Result<T, AppError> {
    match written {
        Ok(row) => {
            release_image(storage, replaced).await;
            Ok(row)
        }
        Err(e) => {
            release_image(storage, stored).await;
            Err(internal(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::testing::RecordingStorage;

    #[tokio::test]
    async fn test_successful_write_releases_replaced_image() {
        let storage = RecordingStorage::default();
        let row = settle_image_write(
            &storage,
            Ok::<_, String>(7),
            Some("categories/img_2"),
            Some("categories/img_1"),
        )
        .await
        .unwrap();
        assert_eq!(row, 7);
        assert_eq!(storage.deleted(), vec!["categories/img_1".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_write_releases_new_image() {
        let storage = RecordingStorage::default();
        let err = settle_image_write(
            &storage,
            Err::<(), _>("duplicate key value violates unique constraint"),
            Some("categories/img_2"),
            Some("categories/img_1"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(storage.deleted(), vec!["categories/img_2".to_string()]);
    }

    #[tokio::test]
    async fn test_placeholders_and_missing_ids_are_kept() {
        let storage = RecordingStorage::default();
        settle_image_write(&storage, Err::<(), _>("db down"), Some("default_store_1_2"), None)
            .await
            .unwrap_err();
        settle_image_write(&storage, Ok::<_, String>(()), None, Some("default_product_1"))
            .await
            .unwrap();
        settle_image_write(&storage, Ok::<_, String>(()), Some("products/img_1"), None)
            .await
            .unwrap();
        assert!(storage.deleted().is_empty());
    }

    #[test]
    fn test_form_json_reports_missing_data_part() {
        let form = MultipartForm::default();
        let err = form.json::<serde_json::Value>().unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);

        let form = MultipartForm {
            data: Some(b"{not json".to_vec()),
            image: None,
        };
        assert_eq!(
            form.json::<serde_json::Value>().unwrap_err().code,
            ErrorCode::InvalidFormat
        );
    }
}
