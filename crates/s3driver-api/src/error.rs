use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use s3driver_common::error::DriverError;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

pub struct ApiError(pub DriverError);

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Map<String, Value>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            DriverError::UnprocessableInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DriverError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DriverError::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            DriverError::InvalidResourceId(_)
            | DriverError::InvalidResourceType(_)
            | DriverError::InvalidDriverParams(_)
            | DriverError::Credentials(_)
            | DriverError::TokenDecode(_)
            | DriverError::IncompleteToken(_)
            | DriverError::StorageConfig(_)
            | DriverError::Provisioning { .. }
            | DriverError::StatusUnavailable { .. }
            | DriverError::Storage(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.0.error_code();
        let message = self.0.to_string();
        error!(code, status = status.as_u16(), message = %message, "request failed");

        let body = ErrorBody {
            error: code,
            message,
            details: self.0.details(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<DriverError> for ApiError {
    fn from(err: DriverError) -> Self {
        ApiError(err)
    }
}
