pub mod aws;
pub mod memory;
pub mod traits;

pub use aws::{AwsClientConfig, AwsClientFactory};
pub use memory::{MemoryBackend, MemoryClientFactory, StorageOp};
pub use traits::{BucketClient, BucketClientFactory, BucketPresence};
