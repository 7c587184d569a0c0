//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Point endpoints are mounted under `/api/v1`; `/health` is at the root.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod requester;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "traffic-geopoints",
        description = "Geo-located traffic incident reports with proximity search and GeoJSON export."
    ),
    paths(
        handlers::points::create_point,
        handlers::points::list_points,
        handlers::points::points_geojson,
        handlers::points::my_points,
        handlers::points::get_point,
        handlers::points::update_point,
        handlers::points::delete_point,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::CreatePointRequest,
        dto::UpdatePointRequest,
        dto::PointResponse,
        dto::OwnerDto,
        dto::PointListResponse,
        dto::ProximityResultDto,
        dto::ProximityListResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Points", description = "Incident point reports"),
        (name = "System", description = "Service status"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: routes, request tracing, the request
/// timeout and (with the `swagger-ui` feature) the documentation UI.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = build_router();

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(timeout_layer(request_timeout)),
        )
        .with_state(state)
}

/// Answers `408 Request Timeout` once a request runs longer than `limit`.
fn timeout_layer(limit: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, limit)
}
