use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use s3driver_auth::AwsCredentials;
use s3driver_common::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketPresence {
    Exists,
    Absent,
}

/// Bucket operations bound to one set of credentials and one region.
#[async_trait]
pub trait BucketClient: Debug + Send + Sync {
    /// Creates the bucket and returns the region it lives in.
    async fn create_bucket(&self, bucket: &str) -> Result<String>;
    /// Purges the bucket contents, then removes the bucket.
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;
    async fn head_bucket(&self, bucket: &str) -> Result<BucketPresence>;
}

pub trait BucketClientFactory: Send + Sync {
    fn connect(&self, credentials: &AwsCredentials, region: &str) -> Result<Arc<dyn BucketClient>>;
}
