use std::io::ErrorKind;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use http::{StatusCode, header};
use tracing::warn;

use crate::state::ApiState;

/// Serves the OpenAPI document from disk so it can be replaced without a rebuild.
pub async fn openapi_spec(State(state): State<ApiState>) -> Response {
    match tokio::fs::read(&state.spec_path).await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) if err.kind() == ErrorKind::NotFound => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            warn!(path = %state.spec_path.display(), error = %err, "reading openapi document failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
