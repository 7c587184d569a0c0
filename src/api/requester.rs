//! Requester identity extractor.
//!
//! Authentication happens upstream; the authenticated user's id reaches
//! this service in the [`REQUESTER_HEADER`] header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::OwnerId;
use crate::error::PointError;

/// Header carrying the authenticated user's UUID.
pub const REQUESTER_HEADER: &str = "x-user-id";

/// The authenticated user making the request.
///
/// Rejects with [`PointError::Unauthenticated`] when the header is
/// missing or is not a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester(pub OwnerId);

impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = PointError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(REQUESTER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<OwnerId>().ok())
            .map(Self)
            .ok_or(PointError::Unauthenticated)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(header: Option<&str>) -> Result<Requester, PointError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(REQUESTER_HEADER, value);
        }
        let Ok(request) = builder.body(()) else {
            panic!("request should build");
        };
        let (mut parts, ()) = request.into_parts();
        Requester::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn valid_uuid_is_accepted() {
        let id = uuid::Uuid::new_v4();
        let Ok(Requester(owner)) = extract(Some(&id.to_string())).await else {
            panic!("header should be accepted");
        };
        assert_eq!(owner, OwnerId::from_uuid(id));
    }

    #[tokio::test]
    async fn missing_or_malformed_header_is_unauthenticated() {
        assert!(matches!(extract(None).await, Err(PointError::Unauthenticated)));
        assert!(matches!(
            extract(Some("not-a-uuid")).await,
            Err(PointError::Unauthenticated)
        ));
    }
}
