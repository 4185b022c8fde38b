use s3driver_common::error::{DriverError, Result};

/// Lowercase letters, digits and hyphens; at least three characters, starting
/// and ending with a letter or digit.
pub fn is_valid_resource_id(id: &str) -> bool {
    let bytes = id.as_bytes();
    if bytes.len() < 3 {
        return false;
    }

    let edge = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    edge(bytes[0])
        && edge(bytes[bytes.len() - 1])
        && bytes.iter().all(|&b| edge(b) || b == b'-')
}

pub fn validate_resource_id(id: &str) -> Result<()> {
    if is_valid_resource_id(id) {
        Ok(())
    } else {
        Err(DriverError::InvalidResourceId(id.to_string()))
    }
}
