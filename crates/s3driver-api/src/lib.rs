pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::driver_router;
pub use state::ApiState;

/// Carries the resource token from the previous call.
pub const DRIVER_COOKIE_HEADER: &str = "Humanitec-Driver-Cookie";
/// Carries the resource token the caller should store for the next call.
pub const SET_DRIVER_COOKIE_HEADER: &str = "Set-Humanitec-Driver-Cookie";

pub const APP_NAME: &str = "s3driver";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
