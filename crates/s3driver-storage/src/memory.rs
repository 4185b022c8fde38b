use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use s3driver_auth::AwsCredentials;
use s3driver_common::error::{DriverError, Result};
use tracing::debug;

use crate::traits::{BucketClient, BucketClientFactory, BucketPresence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOp {
    Create,
    Delete,
    Head,
}

#[derive(Debug, Clone)]
struct MemoryBucket {
    region: String,
    owner: String,
}

/// In-process stand-in for the object store. Deterministic, shared by every
/// client handed out by [`MemoryClientFactory`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    buckets: RwLock<HashMap<String, MemoryBucket>>,
    failures: RwLock<HashMap<StorageOp, String>>,
    rejected_keys: RwLock<HashSet<String>>,
    creates: AtomicUsize,
    deletes: AtomicUsize,
    heads: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `op` fail with `reason`.
    pub fn fail_next(&self, op: StorageOp, reason: impl Into<String>) -> Result<()> {
        self.failures_write()?.insert(op, reason.into());
        Ok(())
    }

    /// Refuses to hand out clients for this access key id.
    pub fn reject_access_key(&self, access_key_id: impl Into<String>) -> Result<()> {
        self.rejected_keys_write()?.insert(access_key_id.into());
        Ok(())
    }

    /// Drops a bucket behind the driver's back.
    pub fn remove_bucket(&self, bucket: &str) -> Result<bool> {
        Ok(self.buckets_write()?.remove(bucket).is_some())
    }

    pub fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        Ok(self.buckets_read()?.contains_key(bucket))
    }

    pub fn bucket_region(&self, bucket: &str) -> Result<Option<String>> {
        Ok(self
            .buckets_read()?
            .get(bucket)
            .map(|entry| entry.region.clone()))
    }

    pub fn bucket_count(&self) -> Result<usize> {
        Ok(self.buckets_read()?.len())
    }

    pub fn calls(&self, op: StorageOp) -> usize {
        match op {
            StorageOp::Create => self.creates.load(Ordering::SeqCst),
            StorageOp::Delete => self.deletes.load(Ordering::SeqCst),
            StorageOp::Head => self.heads.load(Ordering::SeqCst),
        }
    }

    fn record(&self, op: StorageOp) -> Result<()> {
        let counter = match op {
            StorageOp::Create => &self.creates,
            StorageOp::Delete => &self.deletes,
            StorageOp::Head => &self.heads,
        };
        counter.fetch_add(1, Ordering::SeqCst);

        match self.failures_write()?.remove(&op) {
            Some(reason) => Err(DriverError::Storage(reason)),
            None => Ok(()),
        }
    }

    fn buckets_read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, MemoryBucket>>> {
        self.buckets
            .read()
            .map_err(|_| DriverError::Storage("memory bucket lock poisoned".to_string()))
    }

    fn buckets_write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, MemoryBucket>>> {
        self.buckets
            .write()
            .map_err(|_| DriverError::Storage("memory bucket lock poisoned".to_string()))
    }

    fn failures_write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<StorageOp, String>>> {
        self.failures
            .write()
            .map_err(|_| DriverError::Storage("memory failure lock poisoned".to_string()))
    }

    fn rejected_keys_write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashSet<String>>> {
        self.rejected_keys
            .write()
            .map_err(|_| DriverError::Storage("memory credential lock poisoned".to_string()))
    }

    fn is_rejected(&self, access_key_id: &str) -> Result<bool> {
        Ok(self
            .rejected_keys
            .read()
            .map_err(|_| DriverError::Storage("memory credential lock poisoned".to_string()))?
            .contains(access_key_id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryClientFactory {
    backend: Arc<MemoryBackend>,
}

impl MemoryClientFactory {
    pub fn new(backend: Arc<MemoryBackend>) -> Self {
        Self { backend }
    }
}

impl BucketClientFactory for MemoryClientFactory {
    fn connect(&self, credentials: &AwsCredentials, region: &str) -> Result<Arc<dyn BucketClient>> {
        if !credentials.is_complete() || region.is_empty() {
            return Err(DriverError::StorageConfig(
                "credentials and region are required".to_string(),
            ));
        }
        if self.backend.is_rejected(&credentials.access_key_id)? {
            return Err(DriverError::StorageConfig(format!(
                "access key {} is not accepted",
                credentials.access_key_id
            )));
        }

        Ok(Arc::new(MemoryBucketClient {
            backend: Arc::clone(&self.backend),
            region: region.to_string(),
            owner: credentials.access_key_id.clone(),
        }))
    }
}

#[derive(Debug)]
struct MemoryBucketClient {
    backend: Arc<MemoryBackend>,
    region: String,
    owner: String,
}

#[async_trait]
impl BucketClient for MemoryBucketClient {
    async fn create_bucket(&self, bucket: &str) -> Result<String> {
        self.backend.record(StorageOp::Create)?;

        let mut buckets = self.backend.buckets_write()?;
        if buckets.contains_key(bucket) {
            return Err(DriverError::Storage(format!(
                "s3 bucket name already exists {bucket:?}"
            )));
        }
        buckets.insert(
            bucket.to_string(),
            MemoryBucket {
                region: self.region.clone(),
                owner: self.owner.clone(),
            },
        );
        debug!(bucket = %bucket, region = %self.region, "memory bucket created");
        Ok(self.region.clone())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.backend.record(StorageOp::Delete)?;

        match self.backend.buckets_write()?.remove(bucket) {
            Some(entry) => {
                debug!(bucket = %bucket, owner = %entry.owner, "memory bucket deleted");
                Ok(())
            }
            None => Err(DriverError::Storage(format!(
                "deleting s3 bucket {bucket:?}: no such bucket"
            ))),
        }
    }

    async fn head_bucket(&self, bucket: &str) -> Result<BucketPresence> {
        self.backend.record(StorageOp::Head)?;

        if self.backend.buckets_read()?.contains_key(bucket) {
            Ok(BucketPresence::Exists)
        } else {
            Ok(BucketPresence::Absent)
        }
    }
}
