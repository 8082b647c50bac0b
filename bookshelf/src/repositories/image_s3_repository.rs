use anyhow::Context;
use async_trait::async_trait;
use s3::Bucket;
use tracing::info;

use crate::ports::image_repository::{ImageRepository, ImageRepositoryError};

/// Simple Storage Service (S3) client to store the cover images
///
/// Objects are served publicly from `<public_url_base>/<bucket>/<object>`.
pub struct ImageS3Repository {
    bucket: Bucket,
    public_url_base: String,
}

impl ImageS3Repository {
    pub fn new(bucket: Bucket, public_url_base: &str) -> Self {
        Self {
            bucket,
            public_url_base: public_url_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn public_url(&self, object_name: &str) -> String {
        format!("{}/{}/{}", self.public_url_base, self.bucket.name, object_name)
    }
}

#[async_trait]
impl ImageRepository for ImageS3Repository {
    #[tracing::instrument(name = "Add image to bucket", skip(self, content))]
    async fn save_image(
        &self,
        object_name: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<String, ImageRepositoryError> {
        info!("Saving image at {}", object_name);

        self.bucket
            .put_object_with_content_type(object_name, content, content_type)
            .await
            .context(format!("Failed to upload {} to the bucket", object_name))?;

        Ok(self.public_url(object_name))
    }
}
