//! Product image upload helpers: content-type/size validation and local
//! disk storage with metadata destined for the `files` collection.

use crate::models::StoredFile;
use anyhow::anyhow;
use service_core::error::AppError;
use uuid::Uuid;

pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "image/webp"];

pub fn validate_image(mime_type: &str, size: usize) -> Result<(), AppError> {
    if !ALLOWED_IMAGE_TYPES.contains(&mime_type) {
        return Err(AppError::BadRequest(anyhow!(
            "Only jpeg, png, webp images are allowed"
        )));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest(anyhow!(
            "Each image must be less than 1MB"
        )));
    }
    Ok(())
}

/// Write image bytes under `upload_dir` and return the metadata record.
pub async fn store_image(
    upload_dir: &str,
    original_name: &str,
    mime_type: &str,
    data: &[u8],
) -> Result<StoredFile, AppError> {
    let extension = std::path::Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("bin");

    let id = Uuid::new_v4();
    let file_name = format!("{}.{}", id, extension);

    tokio::fs::create_dir_all(upload_dir).await?;
    tokio::fs::write(std::path::Path::new(upload_dir).join(&file_name), data).await?;

    Ok(StoredFile {
        id,
        original_name: original_name.to_string(),
        url: format!("/uploads/{}", file_name),
        size: data.len() as i64,
        mime_type: mime_type.to_string(),
    })
}

/// Best-effort removal of a stored image from disk.
pub async fn remove_image(upload_dir: &str, url: &str) {
    if let Some(file_name) = url.rsplit('/').next() {
        let path = std::path::Path::new(upload_dir).join(file_name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(error = %e, path = %path.display(), "Failed to remove image file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_types_under_limit() {
        for mime in ALLOWED_IMAGE_TYPES {
            assert!(validate_image(mime, 512 * 1024).is_ok());
        }
    }

    #[test]
    fn rejects_disallowed_type() {
        assert!(validate_image("image/gif", 1024).is_err());
        assert!(validate_image("application/pdf", 1024).is_err());
    }

    #[test]
    fn rejects_oversized_image() {
        assert!(validate_image("image/png", MAX_IMAGE_BYTES + 1).is_err());
    }
}
