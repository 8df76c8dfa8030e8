//! S3 bucket listing, emptying, and deletion

use crate::aws::context::AwsContext;
use crate::aws::error::{classify_sdk_error, AwsError};
use anyhow::{Context, Result};
use aws_sdk_s3::types::Bucket;
use aws_sdk_s3::Client;
use tracing::{debug, info};

/// S3 client for listing buckets and deleting them with their contents
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Create an S3 client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.s3_client(),
        }
    }

    /// List all buckets owned by the account.
    pub async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .context("Failed to list buckets")?;

        let buckets: Vec<Bucket> = response.buckets().to_vec();
        debug!(count = buckets.len(), "Listed S3 buckets");
        Ok(buckets)
    }

    /// Empty a bucket and then delete it.
    ///
    /// Deletes current objects first, then any object versions and delete
    /// markers left behind if versioning was ever enabled, then the bucket
    /// itself. A failure partway through leaves the bucket partially
    /// emptied; there is no rollback.
    pub async fn empty_and_delete_bucket(&self, bucket: &str) -> Result<(), AwsError> {
        info!(bucket = %bucket, "Emptying and deleting bucket");

        self.delete_all_objects(bucket).await?;
        self.delete_all_versions(bucket).await?;

        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(())
    }

    /// Delete every current object in the bucket, following pagination.
    async fn delete_all_objects(&self, bucket: &str) -> Result<(), AwsError> {
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket);
            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| classify_sdk_error(&e))?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    debug!(bucket = %bucket, key = %key, "Deleting object");
                    self.client
                        .delete_object()
                        .bucket(bucket)
                        .key(key)
                        .send()
                        .await
                        .map_err(|e| classify_sdk_error(&e))?;
                }
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(())
    }

    /// Delete every object version and delete marker, following pagination.
    ///
    /// A no-op for buckets that never had versioning enabled.
    async fn delete_all_versions(&self, bucket: &str) -> Result<(), AwsError> {
        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;

        loop {
            let mut request = self.client.list_object_versions().bucket(bucket);
            if let Some(marker) = &key_marker {
                request = request.key_marker(marker);
            }
            if let Some(marker) = &version_id_marker {
                request = request.version_id_marker(marker);
            }

            let response = request.send().await.map_err(|e| classify_sdk_error(&e))?;

            for version in response.versions() {
                if let (Some(key), Some(version_id)) = (version.key(), version.version_id()) {
                    debug!(bucket = %bucket, key = %key, version = %version_id, "Deleting object version");
                    self.client
                        .delete_object()
                        .bucket(bucket)
                        .key(key)
                        .version_id(version_id)
                        .send()
                        .await
                        .map_err(|e| classify_sdk_error(&e))?;
                }
            }

            for marker in response.delete_markers() {
                if let (Some(key), Some(version_id)) = (marker.key(), marker.version_id()) {
                    debug!(bucket = %bucket, key = %key, version = %version_id, "Deleting delete marker");
                    self.client
                        .delete_object()
                        .bucket(bucket)
                        .key(key)
                        .version_id(version_id)
                        .send()
                        .await
                        .map_err(|e| classify_sdk_error(&e))?;
                }
            }

            if response.is_truncated() == Some(true) {
                key_marker = response.next_key_marker().map(|s| s.to_string());
                version_id_marker = response.next_version_id_marker().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(())
    }
}
