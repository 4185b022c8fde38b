use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    client::Waiters,
    config::{BehaviorVersion, Credentials, Region},
    error::DisplayErrorContext,
    types::{BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier},
};
use s3driver_auth::AwsCredentials;
use s3driver_common::error::{DriverError, Result};
use tracing::{debug, info};

use crate::traits::{BucketClient, BucketClientFactory, BucketPresence};

const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
pub struct AwsClientConfig {
    /// S3-compatible endpoint; switches the client to path-style addressing.
    pub endpoint: Option<String>,
    /// Upper bound on waiting for a freshly created bucket to become visible.
    pub bucket_wait: Duration,
}

impl Default for AwsClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            bucket_wait: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AwsClientFactory {
    config: AwsClientConfig,
}

impl AwsClientFactory {
    pub fn new(config: AwsClientConfig) -> Self {
        Self { config }
    }
}

impl BucketClientFactory for AwsClientFactory {
    fn connect(&self, credentials: &AwsCredentials, region: &str) -> Result<Arc<dyn BucketClient>> {
        if !credentials.is_complete() {
            return Err(DriverError::StorageConfig(
                "access key id and secret access key are required".to_string(),
            ));
        }
        if region.is_empty() {
            return Err(DriverError::StorageConfig("region is required".to_string()));
        }

        let provider = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "s3driver",
        );
        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(provider);
        if let Some(endpoint) = &self.config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Arc::new(AwsBucketClient {
            client: Client::from_conf(builder.build()),
            region: region.to_string(),
            bucket_wait: self.config.bucket_wait,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct AwsBucketClient {
    client: Client,
    region: String,
    bucket_wait: Duration,
}

impl AwsBucketClient {
    async fn purge_objects(&self, bucket: &str) -> Result<usize> {
        let mut deleted = 0;
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|err| {
                    DriverError::Storage(format!(
                        "listing objects of s3 bucket {bucket:?}: {}",
                        DisplayErrorContext(&err)
                    ))
                })?;

            let objects = page
                .contents()
                .iter()
                .filter_map(|object| object.key())
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|err| DriverError::Storage(format!("building object identifier: {err}")))?;

            if !objects.is_empty() {
                let count = objects.len();
                let delete = Delete::builder()
                    .set_objects(Some(objects))
                    .quiet(true)
                    .build()
                    .map_err(|err| DriverError::Storage(format!("building delete request: {err}")))?;
                let output = self
                    .client
                    .delete_objects()
                    .bucket(bucket)
                    .delete(delete)
                    .send()
                    .await
                    .map_err(|err| {
                        DriverError::Storage(format!(
                            "deleting objects from s3 bucket {bucket:?}: {}",
                            DisplayErrorContext(&err)
                        ))
                    })?;
                if let Some(failed) = output.errors().first() {
                    return Err(DriverError::Storage(format!(
                        "deleting object {:?} from s3 bucket {bucket:?}: {}",
                        failed.key().unwrap_or_default(),
                        failed.message().unwrap_or("unknown error")
                    )));
                }
                deleted += count;
            }

            match page.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        Ok(deleted)
    }
}

#[async_trait]
impl BucketClient for AwsBucketClient {
    async fn create_bucket(&self, bucket: &str) -> Result<String> {
        let mut request = self.client.create_bucket().bucket(bucket);
        // us-east-1 rejects an explicit location constraint
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        if let Err(err) = request.send().await {
            let err = err.into_service_error();
            if err.is_bucket_already_exists() || err.is_bucket_already_owned_by_you() {
                return Err(DriverError::Storage(format!(
                    "s3 bucket name already exists {bucket:?}: {}",
                    DisplayErrorContext(&err)
                )));
            }
            return Err(DriverError::Storage(format!(
                "creating s3 bucket {bucket:?}: {}",
                DisplayErrorContext(&err)
            )));
        }

        self.client
            .wait_until_bucket_exists()
            .bucket(bucket)
            .wait(self.bucket_wait)
            .await
            .map_err(|err| {
                DriverError::Storage(format!(
                    "waiting for s3 bucket {bucket:?} to be provisioned: {}",
                    DisplayErrorContext(&err)
                ))
            })?;

        info!(bucket = %bucket, region = %self.region, "s3 bucket created");
        Ok(self.region.clone())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let purged = self.purge_objects(bucket).await?;
        debug!(bucket = %bucket, objects = purged, "s3 bucket emptied");

        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| {
                DriverError::Storage(format!(
                    "deleting s3 bucket {bucket:?}: {}",
                    DisplayErrorContext(&err)
                ))
            })?;

        info!(bucket = %bucket, region = %self.region, "s3 bucket deleted");
        Ok(())
    }

    async fn head_bucket(&self, bucket: &str) -> Result<BucketPresence> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(BucketPresence::Exists),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_not_found() {
                    Ok(BucketPresence::Absent)
                } else {
                    Err(DriverError::Storage(format!(
                        "checking s3 bucket {bucket:?}: {}",
                        DisplayErrorContext(&err)
                    )))
                }
            }
        }
    }
}
