pub mod error;
pub mod time;
pub mod types;

pub use error::{DriverError, Result};
pub use types::{DataMap, DriverInputs, DriverOutputs, Manifest, ValuesSecrets, WellKnownKey};
