use async_trait::async_trait;
use common::helper::error_chain_fmt;

/// Object storage holding the book cover images
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Stores `content` under `object_name` and returns the public URL of the object
    async fn save_image(
        &self,
        object_name: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<String, ImageRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum ImageRepositoryError {
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for ImageRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
