//! Opaque state carried between calls in the driver-cookie headers.
//!
//! The token is JSON, base64-encoded with the standard alphabet so it fits in
//! a single header value. An empty header is the "no prior state" sentinel.

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use s3driver_common::{
    error::{DriverError, Result},
    types::{ValuesSecrets, WellKnownKey, null_as_default},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceToken {
    #[serde(rename = "id", default)]
    pub resource_id: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(rename = "aws_access_key_id", default)]
    pub access_key_id: String,
    #[serde(rename = "aws_secret_access_key", default)]
    pub access_secret: String,
    #[serde(rename = "resource", default, deserialize_with = "null_as_default")]
    pub resource_data: ValuesSecrets,
}

impl ResourceToken {
    pub fn decode(header: &str) -> Result<Self> {
        if header.is_empty() {
            return Ok(Self::default());
        }

        let bytes = STANDARD
            .decode(header)
            .map_err(|err| DriverError::TokenDecode(format!("invalid base64: {err}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|err| DriverError::TokenDecode(format!("invalid token payload: {err}")))
    }

    pub fn encode(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|err| DriverError::Serialization(format!("encoding resource token: {err}")))?;
        Ok(STANDARD.encode(bytes))
    }

    /// True once a resource has been provisioned for this token.
    pub fn has_resource(&self) -> bool {
        !self.resource_id.is_empty()
    }

    pub fn bucket(&self) -> Option<&str> {
        self.resource_data.values.get_str(WellKnownKey::Bucket)
    }
}
