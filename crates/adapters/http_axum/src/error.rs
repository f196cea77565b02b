//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use livefeed_domain::error::{LiveFeedError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`LiveFeedError`] to an HTTP response with appropriate status code.
pub struct ApiError(LiveFeedError);

impl From<LiveFeedError> for ApiError {
    fn from(err: LiveFeedError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            LiveFeedError::Validation(_) => StatusCode::BAD_REQUEST,
            LiveFeedError::NotAuthorized => StatusCode::UNAUTHORIZED,
            LiveFeedError::WriteFailed(_) => StatusCode::BAD_GATEWAY,
            LiveFeedError::Subscription(_) => StatusCode::SERVICE_UNAVAILABLE,
            LiveFeedError::AlreadySubscribed | LiveFeedError::NotSubscribed => {
                StatusCode::CONFLICT
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            LiveFeedError::Validation(err) => err.to_string(),
            LiveFeedError::WriteFailed(source) | LiveFeedError::Subscription(source) => {
                tracing::error!(error = %self.0, %source, "feed store error");
                self.0.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_validation_to_bad_request() {
        let err = ApiError::from(ValidationError::EmptyPayload);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn should_map_missing_identity_to_unauthorized() {
        let err = ApiError::from(LiveFeedError::NotAuthorized);
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn should_map_write_failure_to_bad_gateway() {
        let io = std::io::Error::other("down");
        let err = ApiError::from(LiveFeedError::write_failed(io));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn should_map_listener_failure_to_service_unavailable() {
        let io = std::io::Error::other("down");
        let err = ApiError::from(LiveFeedError::subscription(io));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
