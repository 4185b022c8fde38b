use std::sync::Arc;

use s3driver_auth::{AwsCredentials, extract_credentials};
use s3driver_common::{
    error::{DriverError, Result},
    time::now,
    types::{DriverInputs, DriverOutputs, ValuesSecrets, WellKnownKey},
};
use s3driver_storage::traits::{BucketClient, BucketClientFactory};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    status::{BucketStatus, resolve_bucket_status},
    token::ResourceToken,
    types::{DeleteOutcome, S3_RESOURCE_TYPE, UpsertOutcome},
    validation::validate_resource_id,
};

/// Drives bucket provisioning. Holds no per-resource state; everything it
/// needs arrives with the request and leaves again in the token.
pub struct LifecycleSys {
    clients: Arc<dyn BucketClientFactory>,
}

impl LifecycleSys {
    pub fn new(clients: Arc<dyn BucketClientFactory>) -> Self {
        Self { clients }
    }

    pub async fn upsert(
        &self,
        resource_id: &str,
        inputs: DriverInputs,
        token: ResourceToken,
    ) -> Result<UpsertOutcome> {
        validate_resource_id(resource_id)?;
        if inputs.resource_type != S3_RESOURCE_TYPE {
            return Err(DriverError::InvalidResourceType(inputs.resource_type));
        }
        let driver = inputs.driver_params.unwrap_or_default();

        let credentials = extract_credentials(&driver.secrets)?;
        let region = driver
            .values
            .get_str(WellKnownKey::Region)
            .filter(|region| !region.is_empty())
            .ok_or_else(|| {
                DriverError::InvalidDriverParams(
                    "driver values should include 'region'".to_string(),
                )
            })?
            .to_string();

        let client = self.clients.connect(&credentials, &region)?;

        let (status, mut resource) = if token.has_resource() {
            let status = resolve_bucket_status(true, token.bucket(), client.as_ref()).await;
            if let BucketStatus::Error(reason) = &status {
                return Err(DriverError::StatusUnavailable {
                    bucket: token.bucket().unwrap_or_default().to_string(),
                    reason: reason.clone(),
                });
            }
            (status, token.resource_data.clone())
        } else {
            let bucket = Uuid::new_v4().to_string();
            let created_region =
                create_bucket(client.as_ref(), &bucket, &inputs.resource_params, &driver).await?;

            let mut resource = ValuesSecrets::default();
            resource.values.set_str(WellKnownKey::Region, created_region);
            resource.values.set_str(WellKnownKey::Bucket, bucket);
            let status = resolve_bucket_status(false, None, client.as_ref()).await;
            (status, resource)
        };

        // credentials may have been rotated by the caller since the last call
        merge_credentials(&mut resource, &credentials);

        let next = ResourceToken {
            resource_id: if token.resource_id.is_empty() {
                resource_id.to_string()
            } else {
                token.resource_id.clone()
            },
            resource_type: S3_RESOURCE_TYPE.to_string(),
            created_at: token.created_at.or_else(|| Some(now())),
            region,
            access_key_id: credentials.access_key_id.clone(),
            access_secret: credentials.secret_access_key.clone(),
            resource_data: resource.clone(),
        };
        let encoded = next.encode()?;
        debug!(
            resource_id = %resource_id,
            bucket = next.bucket().unwrap_or_default(),
            status = status.as_str(),
            "resource token updated"
        );

        Ok(UpsertOutcome {
            status,
            outputs: DriverOutputs {
                resource_id: resource_id.to_string(),
                resource_type: S3_RESOURCE_TYPE.to_string(),
                resource,
                manifests: Vec::new(),
            },
            token: encoded,
        })
    }

    pub async fn delete(&self, resource_id: &str, token: ResourceToken) -> Result<DeleteOutcome> {
        validate_resource_id(resource_id)?;
        if !token.has_resource() {
            debug!(resource_id = %resource_id, "no resource recorded, nothing to delete");
            return Ok(DeleteOutcome::NotFound);
        }
        if token.resource_type != S3_RESOURCE_TYPE {
            return Err(DriverError::InvalidResourceType(token.resource_type));
        }

        let bucket = token
            .bucket()
            .filter(|bucket| !bucket.is_empty())
            .ok_or_else(|| DriverError::IncompleteToken("no bucket recorded".to_string()))?;
        let credentials = AwsCredentials::new(&token.access_key_id, &token.access_secret);
        if !credentials.is_complete() {
            return Err(DriverError::IncompleteToken(
                "no credentials recorded".to_string(),
            ));
        }
        let region = if token.region.is_empty() {
            token
                .resource_data
                .values
                .get_str(WellKnownKey::Region)
                .unwrap_or_default()
        } else {
            token.region.as_str()
        };
        if region.is_empty() {
            return Err(DriverError::IncompleteToken("no region recorded".to_string()));
        }

        let client = self.clients.connect(&credentials, region)?;
        if let Err(err) = client.delete_bucket(bucket).await {
            warn!(bucket = %bucket, error = %err, "s3 bucket deletion failed");
            return Err(DriverError::provisioning(
                format!("Unable to delete the S3 bucket record '{bucket}'"),
                err,
            )
            .with_detail("resource.values", token.resource_data.values.to_value()));
        }

        info!(resource_id = %resource_id, bucket = %bucket, "resource deleted");
        Ok(DeleteOutcome::Deleted {
            bucket: bucket.to_string(),
        })
    }
}

async fn create_bucket(
    client: &dyn BucketClient,
    bucket: &str,
    resource_params: &Map<String, Value>,
    driver: &ValuesSecrets,
) -> Result<String> {
    match client.create_bucket(bucket).await {
        Ok(region) => {
            info!(bucket = %bucket, region = %region, "resource provisioned");
            Ok(region)
        }
        Err(err) => {
            warn!(bucket = %bucket, error = %err, "s3 bucket creation failed");
            Err(DriverError::provisioning("creating S3 bucket", err)
                .with_detail("resource", Value::Object(resource_params.clone()))
                .with_detail("driver.values", driver.values.to_value()))
        }
    }
}

fn merge_credentials(resource: &mut ValuesSecrets, credentials: &AwsCredentials) {
    resource
        .secrets
        .set_str(WellKnownKey::AwsAccessKeyId, &credentials.access_key_id);
    resource
        .secrets
        .set_str(WellKnownKey::AwsSecretAccessKey, &credentials.secret_access_key);
}
