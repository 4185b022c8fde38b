use s3driver_storage::traits::{BucketClient, BucketPresence};
use tracing::warn;

/// Outcome of checking a bucket against the live backend. Evaluated fresh on
/// every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketStatus {
    /// No prior resource; the bucket was created by this call.
    Created,
    /// The recorded bucket still exists.
    Found,
    /// The token records a resource but the bucket is gone.
    NotFound,
    /// The existence probe itself failed.
    Error(String),
}

impl BucketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::Error(_) => "error",
        }
    }
}

/// Resolves the status of `bucket`. Without a prior resource id the caller has
/// just created the bucket, so no probe is sent.
pub async fn resolve_bucket_status(
    has_prior_id: bool,
    bucket: Option<&str>,
    client: &dyn BucketClient,
) -> BucketStatus {
    if !has_prior_id {
        return BucketStatus::Created;
    }

    let Some(bucket) = bucket else {
        warn!("resource token has an id but no recorded bucket");
        return BucketStatus::NotFound;
    };

    match client.head_bucket(bucket).await {
        Ok(BucketPresence::Exists) => BucketStatus::Found,
        Ok(BucketPresence::Absent) => {
            warn!(bucket = %bucket, "recorded bucket no longer exists");
            BucketStatus::NotFound
        }
        Err(err) => BucketStatus::Error(err.to_string()),
    }
}
