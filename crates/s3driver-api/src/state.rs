use std::{path::PathBuf, sync::Arc};

use s3driver_lifecycle::LifecycleSys;

#[derive(Clone)]
pub struct ApiState {
    pub lifecycle: Arc<LifecycleSys>,
    /// OpenAPI document served at `/docs/spec.json`.
    pub spec_path: PathBuf,
}

impl ApiState {
    pub fn new(lifecycle: Arc<LifecycleSys>, spec_path: impl Into<PathBuf>) -> Self {
        Self {
            lifecycle,
            spec_path: spec_path.into(),
        }
    }
}
