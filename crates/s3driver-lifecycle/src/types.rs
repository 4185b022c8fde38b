use s3driver_common::types::DriverOutputs;

use crate::status::BucketStatus;

/// The only resource type this driver provisions.
pub const S3_RESOURCE_TYPE: &str = "s3";

/// Result of a successful upsert.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub status: BucketStatus,
    pub outputs: DriverOutputs,
    /// Encoded token for the outbound state header.
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The incoming token recorded no resource.
    NotFound,
    Deleted { bucket: String },
}
