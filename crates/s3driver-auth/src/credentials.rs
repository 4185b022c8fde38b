use std::fmt;

use s3driver_common::{
    error::{DriverError, Result},
    types::{DataMap, WellKnownKey},
};
use serde_json::{Map, Value};
use tracing::debug;

/// Static access-key pair supplied by the caller on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Pulls the access-key pair out of the driver secrets' `account` block.
pub fn extract_credentials(secrets: &DataMap) -> Result<AwsCredentials> {
    let account = secrets.get_object(WellKnownKey::Account).ok_or_else(|| {
        DriverError::Credentials("driver secrets should contain 'account' map".to_string())
    })?;

    let access_key_id = account_string(account, WellKnownKey::AwsAccessKeyId)?;
    let secret_access_key = account_string(account, WellKnownKey::AwsSecretAccessKey)?;
    debug!(access_key_id = %access_key_id, "extracted account credentials");

    Ok(AwsCredentials::new(access_key_id, secret_access_key))
}

fn account_string(account: &Map<String, Value>, key: WellKnownKey) -> Result<&str> {
    account
        .get(key.as_str())
        .and_then(Value::as_str)
        .ok_or_else(|| {
            DriverError::Credentials(format!(
                "'account' details should include '{}'",
                key.as_str()
            ))
        })
}
