//! API error types with HTTP response mapping.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use prefs::StoreError;
use upstream::UpstreamError;

/// Body text for every 500; internal detail stays in the logs.
pub const GENERIC_SERVER_ERROR: &str = "Server error";

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Upstream metadata API failure.
    Upstream(UpstreamError),
    /// Preference store failure.
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Upstream(err) => {
                tracing::error!(error = %err, kind = err.kind(), "upstream request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_SERVER_ERROR.to_string(),
                )
            }
            ApiError::Store(StoreError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Store(err) => {
                tracing::error!(error = %err, "preference store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_SERVER_ERROR.to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::Upstream(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid JSON body: {}", err.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(err: QueryRejection) -> Self {
        ApiError::BadRequest(format!("Invalid query string: {}", err.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(err: PathRejection) -> Self {
        ApiError::BadRequest(format!("Invalid path: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_keeps_reason() {
        let response = ApiError::BadRequest("Unknown row type".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Unknown row type");
    }

    #[tokio::test]
    async fn upstream_error_is_generic() {
        let err = UpstreamError::Status {
            status: 401,
            message: "Invalid API key: You must be granted a valid key.".to_string(),
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], GENERIC_SERVER_ERROR);
    }

    #[tokio::test]
    async fn store_validation_is_bad_request() {
        let err = StoreError::Validation("clientId and zip required".to_string());
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "clientId and zip required"
        );
    }

    #[tokio::test]
    async fn store_io_error_is_generic() {
        let err = StoreError::Io(std::io::Error::other("disk full at /secret/path"));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], GENERIC_SERVER_ERROR);
    }
}
