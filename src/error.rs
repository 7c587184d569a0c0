//! Service error types with HTTP status code mapping.
//!
//! [`PointError`] is the central error type. The store, the proximity
//! engine and the repositories return it unchanged to their caller; only
//! the HTTP layer turns it into a status code and a structured JSON body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::PointId;
use crate::geometry::CodecError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: latitude must be within [-90, 90]",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`PointError::error_code`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error taxonomy for point storage, search and projection.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status                 |
/// |-----------|---------------------|-----------------------------|
/// | 1000–1999 | Validation / caller | 400 Bad Request / 401       |
/// | 2000–2999 | Lookup / ownership  | 404 Not Found / 403         |
/// | 3000–3999 | Server              | 500 Internal Server Error   |
#[derive(Debug, thiserror::Error)]
pub enum PointError {
    /// Malformed or out-of-range coordinate, category, description or
    /// radius. Raised before anything is persisted.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The referenced point does not exist.
    ///
    /// Also returned when a non-owner deletes a point, so that callers
    /// cannot probe for other users' points.
    #[error("point not found: {0}")]
    NotFound(PointId),

    /// The requester is not the owner of the point.
    #[error("not allowed to modify point {0}")]
    Forbidden(PointId),

    /// The request carried no usable requester identity.
    #[error("missing or malformed requester identity")]
    Unauthenticated,

    /// Geometry could not be encoded or decoded.
    #[error("geometry codec error: {0}")]
    Codec(#[from] CodecError),

    /// The persistence layer failed or is unavailable.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl PointError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::Unauthenticated => 1002,
            Self::NotFound(_) => 2001,
            Self::Forbidden(_) => 2002,
            Self::Persistence(_) => 3001,
            Self::Codec(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Codec(_) | Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Extractor rejections (bad JSON body, path id or query string) are
// caller errors and use the same body as every other validation failure.

impl From<JsonRejection> for PointError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for PointError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for PointError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for PointError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn ownership_and_lookup_map_to_distinct_statuses() {
        let id = PointId::new();
        assert_eq!(PointError::NotFound(id).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(PointError::Forbidden(id).status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn codec_failures_are_server_errors() {
        let err = PointError::from(CodecError::MissingGeometry);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), 3002);
    }

    #[test]
    fn response_carries_status() {
        let response = PointError::Validation("bad radius".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = PointError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn json_rejection_becomes_validation_error() {
        use axum::body::Body;
        use axum::extract::FromRequest;
        use axum::http::{Request, header};

        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"latitude": 1, "longitude": 2, "category": "pothole"}"#,
            ))
        else {
            panic!("request should build");
        };
        let Err(rejection) =
            axum::Json::<crate::api::dto::CreatePointRequest>::from_request(request, &()).await
        else {
            panic!("unknown category should be rejected");
        };
        let err = PointError::from(rejection);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
    }
}
