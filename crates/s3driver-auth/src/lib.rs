pub mod credentials;

pub use credentials::{AwsCredentials, extract_credentials};
