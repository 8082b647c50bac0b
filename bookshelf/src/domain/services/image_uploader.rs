use std::sync::Arc;

use chrono::Utc;
use common::helper::error_chain_fmt;
use tracing::info;

use crate::{
    domain::entities::image_file_name::{ImageFileName, ImageFileNameError},
    ports::image_repository::{ImageRepository, ImageRepositoryError},
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Uploads the cover images of the books to the object storage
pub struct ImageUploader {
    image_repository: Arc<dyn ImageRepository>,
    allowed_extensions: Vec<String>,
}

impl ImageUploader {
    pub fn new(image_repository: Arc<dyn ImageRepository>, allowed_extensions: Vec<String>) -> Self {
        Self {
            image_repository,
            allowed_extensions,
        }
    }

    /// Stores an image under a safe, timestamped, name and returns its public URL
    #[tracing::instrument(name = "Uploading image", skip(self, content))]
    pub async fn upload(
        &self,
        file_name: &str,
        content: &[u8],
        content_type: Option<&str>,
    ) -> Result<String, ImageUploadError> {
        let object_name = ImageFileName::parse(file_name, &self.allowed_extensions, Utc::now())?;

        let public_url = self
            .image_repository
            .save_image(
                object_name.as_ref(),
                content,
                content_type.unwrap_or(DEFAULT_CONTENT_TYPE),
            )
            .await?;

        info!(file_name, public_url, "Uploaded image");
        Ok(public_url)
    }
}

#[derive(thiserror::Error)]
pub enum ImageUploadError {
    #[error(transparent)]
    InvalidFileName(#[from] ImageFileNameError),
    #[error(transparent)]
    StorageError(#[from] ImageRepositoryError),
}

impl std::fmt::Debug for ImageUploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
