use axum::{Json, response::IntoResponse};
use serde_json::json;

use crate::{APP_NAME, APP_VERSION};

pub async fn alive() -> impl IntoResponse {
    format!("{APP_NAME} {APP_VERSION}")
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "app": APP_NAME,
        "version": APP_VERSION,
        "status": "OK",
    }))
}
