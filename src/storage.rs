use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;

use crate::config::Config;
use crate::error::ApiError;

/// Attachment uploads go through the object store's presigned URLs; the
/// backend never proxies image bytes itself.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Time-limited URL authorizing a single PUT of `image_id`.
    async fn signed_upload_url(&self, image_id: &str) -> Result<String, ApiError>;

    /// Stable public URL where the object will be readable once uploaded.
    fn public_url(&self, image_id: &str) -> String;
}

#[derive(Clone)]
pub struct S3Uploads {
    client: Client,
    bucket: String,
    url_expiration: u64,
}

impl S3Uploads {
    pub async fn new(config: &Config) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&sdk_config),
            bucket: config.bucket_name.clone(),
            url_expiration: config.url_expiration,
        }
    }
}

#[async_trait]
impl UploadStore for S3Uploads {
    async fn signed_upload_url(&self, image_id: &str) -> Result<String, ApiError> {
        let presign_config =
            PresigningConfig::expires_in(Duration::from_secs(self.url_expiration))
                .map_err(|e| ApiError::Internal(e.to_string()))?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(image_id)
            .presigned(presign_config)
            .await
            .map_err(|e| ApiError::StoreUnavailable(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    fn public_url(&self, image_id: &str) -> String {
        public_object_url(&self.bucket, image_id)
    }
}

pub fn public_object_url(bucket: &str, image_id: &str) -> String {
    format!("https://{bucket}.s3.amazonaws.com/{image_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_follows_bucket_key_convention() {
        assert_eq!(
            public_object_url("todo-attachments", "img-42"),
            "https://todo-attachments.s3.amazonaws.com/img-42"
        );
    }
}
