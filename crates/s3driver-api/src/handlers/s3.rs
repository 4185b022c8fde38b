use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use s3driver_common::{error::DriverError, types::DriverInputs};
use s3driver_lifecycle::{BucketStatus, DeleteOutcome, ResourceToken, validate_resource_id};
use tracing::debug;

use crate::{DRIVER_COOKIE_HEADER, SET_DRIVER_COOKIE_HEADER, error::ApiError, state::ApiState};

type ApiResult = Result<Response, ApiError>;

fn read_token(headers: &HeaderMap) -> Result<ResourceToken, DriverError> {
    let Some(value) = headers.get(DRIVER_COOKIE_HEADER) else {
        return Ok(ResourceToken::default());
    };
    let value = value.to_str().map_err(|_| {
        DriverError::TokenDecode(format!("{DRIVER_COOKIE_HEADER} is not valid ascii"))
    })?;
    ResourceToken::decode(value.trim())
}

pub fn upsert_status(status: &BucketStatus) -> StatusCode {
    match status {
        BucketStatus::Found => StatusCode::OK,
        BucketStatus::Created | BucketStatus::NotFound => StatusCode::ACCEPTED,
        BucketStatus::Error(_) => StatusCode::BAD_REQUEST,
    }
}

pub async fn upsert_resource(
    State(state): State<ApiState>,
    Path(resource_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult {
    validate_resource_id(&resource_id)?;
    let inputs: DriverInputs = serde_json::from_slice(&body)
        .map_err(|err| DriverError::UnprocessableInput(err.to_string()))?;
    let token = read_token(&headers)?;
    debug!(resource_id = %resource_id, prior = token.has_resource(), "upserting resource");

    let outcome = state.lifecycle.upsert(&resource_id, inputs, token).await?;
    Ok((
        upsert_status(&outcome.status),
        [(SET_DRIVER_COOKIE_HEADER, outcome.token)],
        Json(outcome.outputs),
    )
        .into_response())
}

pub async fn delete_resource(
    State(state): State<ApiState>,
    Path(resource_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult {
    validate_resource_id(&resource_id)?;
    let token = read_token(&headers)?;

    match state.lifecycle.delete(&resource_id, token).await? {
        DeleteOutcome::NotFound => Ok(StatusCode::NOT_FOUND.into_response()),
        DeleteOutcome::Deleted { .. } => {
            Ok((StatusCode::NO_CONTENT, [(SET_DRIVER_COOKIE_HEADER, "")]).into_response())
        }
    }
}
