use std::time::Duration;

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    routing::{get, put},
};
use s3driver_common::error::DriverError;
use tower::{ServiceBuilder, timeout::TimeoutLayer, timeout::error::Elapsed};
use tower_http::trace::TraceLayer;

use crate::{error::ApiError, handlers, state::ApiState};

/// Bounds every request on `router`; an elapsed deadline answers with the
/// regular JSON error body.
pub(crate) fn with_request_timeout<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                if err.is::<Elapsed>() {
                    ApiError(DriverError::RequestTimeout(timeout))
                } else {
                    // only the timeout layer can fail, handlers are infallible
                    ApiError(DriverError::Storage(err.to_string()))
                }
            }))
            .layer(TimeoutLayer::new(timeout)),
    )
}

/// Builds the full application. Only the driver routes are traced so probes
/// stay out of the logs.
pub fn driver_router(state: ApiState, request_timeout: Duration) -> Router {
    let driver = Router::new().route(
        "/s3/{resource_id}",
        put(handlers::s3::upsert_resource).delete(handlers::s3::delete_resource),
    );
    let driver = with_request_timeout(driver, request_timeout).layer(TraceLayer::new_for_http());

    let service = Router::new()
        .route("/alive", get(handlers::health::alive))
        .route("/health", get(handlers::health::health))
        .route("/docs/spec.json", get(handlers::docs::openapi_spec));

    driver.merge(service).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        response::Response,
        routing::get,
    };
    use http_body_util::BodyExt;
    use s3driver_lifecycle::LifecycleSys;
    use s3driver_storage::{MemoryBackend, MemoryClientFactory, StorageOp};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::{driver_router, with_request_timeout};
    use crate::{DRIVER_COOKIE_HEADER, SET_DRIVER_COOKIE_HEADER, state::ApiState};

    fn app_with_spec(spec_path: &str) -> (Arc<MemoryBackend>, Router) {
        let backend = Arc::new(MemoryBackend::new());
        let lifecycle = LifecycleSys::new(Arc::new(MemoryClientFactory::new(Arc::clone(&backend))));
        let state = ApiState::new(Arc::new(lifecycle), spec_path);
        (backend, driver_router(state, Duration::from_secs(5)))
    }

    fn app() -> (Arc<MemoryBackend>, Router) {
        app_with_spec("./does-not-exist/spec.json")
    }

    fn inputs() -> Value {
        json!({
            "type": "s3",
            "resource": {},
            "driver": {
                "values": {"region": "us-east-1"},
                "secrets": {
                    "account": {
                        "aws_access_key_id": "AKIDEXAMPLE",
                        "aws_secret_access_key": "wJalrXUtnFEMI"
                    }
                }
            }
        })
    }

    async fn put(app: &Router, uri: &str, token: Option<&str>, body: &str) -> Response {
        let mut request = Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            request = request.header(DRIVER_COOKIE_HEADER, token);
        }
        app.clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    async fn delete(app: &Router, uri: &str, token: Option<&str>) -> Response {
        let mut request = Request::builder().method("DELETE").uri(uri);
        if let Some(token) = token {
            request = request.header(DRIVER_COOKIE_HEADER, token);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn set_token(response: &Response) -> Option<String> {
        response
            .headers()
            .get(SET_DRIVER_COOKIE_HEADER)
            .map(|value| value.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn upsert_is_idempotent_across_calls() {
        let (backend, app) = app();

        let first = put(&app, "/s3/my-bucket-1", None, &inputs().to_string()).await;
        assert_eq!(first.status(), StatusCode::ACCEPTED);
        let token = set_token(&first).unwrap();
        assert!(!token.is_empty());
        let first_body = json_body(first).await;
        assert_eq!(first_body["id"], "my-bucket-1");
        assert_eq!(first_body["type"], "s3");
        assert_eq!(first_body["manifests"], json!([]));
        assert_eq!(first_body["resource"]["values"]["region"], "us-east-1");
        assert_eq!(
            first_body["resource"]["secrets"]["aws_access_key_id"],
            "AKIDEXAMPLE"
        );
        let bucket = first_body["resource"]["values"]["bucket"].clone();
        assert!(bucket.as_str().is_some_and(|name| !name.is_empty()));

        let second = put(&app, "/s3/my-bucket-1", Some(&token), &inputs().to_string()).await;
        assert_eq!(second.status(), StatusCode::OK);
        assert!(set_token(&second).is_some());
        let second_body = json_body(second).await;
        assert_eq!(second_body["resource"]["values"]["bucket"], bucket);
        assert_eq!(backend.calls(StorageOp::Create), 1);
    }

    #[tokio::test]
    async fn missing_account_sets_no_token() {
        let (_backend, app) = app();
        let mut body = inputs();
        body["driver"]["secrets"] = json!({});

        let response = put(&app, "/s3/my-bucket-1", None, &body.to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(set_token(&response).is_none());
        let body = json_body(response).await;
        assert_eq!(body["error"], "RES-103");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected() {
        let (_backend, app) = app();

        let response = put(&app, "/s3/Bad_Id", None, &inputs().to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "API-002");

        let response = put(&app, "/s3/my-bucket-1", None, "{not json").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"], "API-003");

        let response = put(&app, "/s3/my-bucket-1", Some("%%%"), &inputs().to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "RES-101");
    }

    #[tokio::test]
    async fn body_without_type_is_a_type_error() {
        let (backend, app) = app();
        let mut body = inputs();
        body.as_object_mut().unwrap().remove("type");

        let response = put(&app, "/s3/my-bucket-1", None, &body.to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(set_token(&response).is_none());
        assert_eq!(json_body(response).await["error"], "API-004");
        assert_eq!(backend.calls(StorageOp::Create), 0);
    }

    #[tokio::test]
    async fn create_failure_reports_details() {
        let (backend, app) = app();
        backend.fail_next(StorageOp::Create, "access denied").unwrap();

        let response = put(&app, "/s3/my-bucket-1", None, &inputs().to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(set_token(&response).is_none());
        let body = json_body(response).await;
        assert_eq!(body["error"], "RES-104");
        assert_eq!(body["details"]["driver.values"], json!({"region": "us-east-1"}));
    }

    #[tokio::test]
    async fn drift_is_accepted() {
        let (backend, app) = app();
        let first = put(&app, "/s3/my-bucket-1", None, &inputs().to_string()).await;
        let token = set_token(&first).unwrap();
        let bucket = json_body(first).await["resource"]["values"]["bucket"]
            .as_str()
            .unwrap()
            .to_string();
        backend.remove_bucket(&bucket).unwrap();

        let response = put(&app, "/s3/my-bucket-1", Some(&token), &inputs().to_string()).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn delete_clears_token_then_reports_not_found() {
        let (backend, app) = app();
        let created = put(&app, "/s3/my-bucket-1", None, &inputs().to_string()).await;
        let token = set_token(&created).unwrap();

        let response = delete(&app, "/s3/my-bucket-1", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(set_token(&response).as_deref(), Some(""));
        assert_eq!(backend.bucket_count().unwrap(), 0);

        let response = delete(&app, "/s3/my-bucket-1", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(set_token(&response).is_none());
    }

    #[tokio::test]
    async fn delete_failure_keeps_token_position() {
        let (backend, app) = app();
        let created = put(&app, "/s3/my-bucket-1", None, &inputs().to_string()).await;
        let token = set_token(&created).unwrap();
        backend.fail_next(StorageOp::Delete, "bucket not empty").unwrap();

        let response = delete(&app, "/s3/my-bucket-1", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(set_token(&response).is_none());
        let body = json_body(response).await;
        assert_eq!(body["error"], "RES-104");
        assert!(body["details"]["resource.values"]["bucket"].is_string());
    }

    #[tokio::test]
    async fn service_endpoints_respond() {
        let (_backend, app) = app();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/alive").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&bytes).starts_with("s3driver "));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await["status"], "OK");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/docs/spec.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn openapi_document_is_served_from_disk() {
        let path = std::env::temp_dir().join(format!("s3driver-spec-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"openapi":"3.0.0"}"#).unwrap();
        let (_backend, app) = app_with_spec(path.to_str().unwrap());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/docs/spec.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["openapi"], "3.0.0");
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn slow_requests_time_out_with_error_body() {
        let slow = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "late"
            }),
        );
        let app = with_request_timeout(slow, Duration::from_millis(20));

        let response = app
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body = json_body(response).await;
        assert_eq!(body["error"], "API-006");
        assert!(body["message"].is_string());
    }
}
