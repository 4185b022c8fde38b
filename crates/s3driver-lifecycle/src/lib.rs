pub mod status;
pub mod system;
pub mod token;
pub mod types;
pub mod validation;

pub use status::{BucketStatus, resolve_bucket_status};
pub use system::LifecycleSys;
pub use token::ResourceToken;
pub use types::{DeleteOutcome, S3_RESOURCE_TYPE, UpsertOutcome};
pub use validation::{is_valid_resource_id, validate_resource_id};
