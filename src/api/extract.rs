//! Request extractors that reject with [`PointError`].
//!
//! axum's own `Json`, `Path` and `Query` answer a malformed request with a
//! plain-text 400/422. These wrappers run the same extraction but turn the
//! rejection into [`PointError::Validation`], so every caller error carries
//! the structured error body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::PointError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(PointError))]
pub struct ApiJson<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(PointError))]
pub struct ApiPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(PointError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};

    use super::*;
    use crate::api::dto::{CreatePointRequest, PointQueryParams};

    fn json_request(body: &'static str) -> Request<Body> {
        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
        else {
            panic!("request should build");
        };
        request
    }

    #[tokio::test]
    async fn well_formed_body_is_extracted() {
        let request = json_request(r#"{"latitude": 1.5, "longitude": 2.5, "type": "otro"}"#);
        let Ok(ApiJson(req)) = ApiJson::<CreatePointRequest>::from_request(request, &()).await
        else {
            panic!("body should be accepted");
        };
        assert!((req.latitude - 1.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn bad_bodies_are_validation_errors() {
        for body in [
            r#"{"latitude": 1, "longitude": 2, "category": "pothole"}"#,
            r#"{"latitude": "north", "longitude": 2, "category": "other"}"#,
            r#"{"latitude": 1"#,
        ] {
            let result = ApiJson::<CreatePointRequest>::from_request(json_request(body), &()).await;
            assert!(
                matches!(result, Err(PointError::Validation(_))),
                "{body}"
            );
        }
    }

    #[tokio::test]
    async fn non_numeric_query_is_a_validation_error() {
        let Ok(request) = Request::builder().uri("/?lat=abc&lng=1&radius=1").body(()) else {
            panic!("request should build");
        };
        let (mut parts, ()) = request.into_parts();
        let result = ApiQuery::<PointQueryParams>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(PointError::Validation(_))));
    }
}
