//! Point handlers: create, list, search, get, update, delete, GeoJSON.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    CreatePointRequest, PointListResponse, PointQueryParams, PointResponse,
    ProximityListResponse, ProximityResultDto, UpdatePointRequest,
};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::requester::Requester;
use crate::app_state::AppState;
use crate::domain::{Point, PointId};
use crate::error::{ErrorResponse, PointError};
use crate::geometry::export::{to_distance_collection, to_feature_collection};

fn list_response(points: &[Point]) -> Result<PointListResponse, PointError> {
    let points = points
        .iter()
        .map(PointResponse::from_point)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PointListResponse {
        count: points.len(),
        points,
    })
}

/// `POST /points` — Report a new incident.
///
/// # Errors
///
/// Returns [`PointError`] on invalid input or storage failure.
#[utoipa::path(
    post,
    path = "/api/v1/points",
    tag = "Points",
    summary = "Create a point",
    description = "Creates an incident point owned by the requester. The category may be sent as `category` or `type`.",
    params(("x-user-id" = String, Header, description = "Authenticated user UUID")),
    request_body = CreatePointRequest,
    responses(
        (status = 201, description = "Point created", body = PointResponse),
        (status = 400, description = "Invalid coordinates, category or description", body = ErrorResponse),
        (status = 401, description = "Missing or malformed requester", body = ErrorResponse),
    )
)]
pub async fn create_point(
    State(state): State<AppState>,
    Requester(owner): Requester,
    ApiJson(req): ApiJson<CreatePointRequest>,
) -> Result<impl IntoResponse, PointError> {
    let point = state.point_store.create(owner, req.into()).await?;
    tracing::info!(point_id = %point.id, %owner, category = %point.category, "point created");

    Ok((StatusCode::CREATED, Json(PointResponse::from_point(&point)?)))
}

/// `GET /points` — List every point, or search when `lat`, `lng` and
/// `radius` are given.
///
/// # Errors
///
/// Returns [`PointError`] on invalid search parameters or storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/points",
    tag = "Points",
    summary = "List or search points",
    description = "Without parameters, returns every point oldest first. With `lat`, `lng` and `radius` (km), returns the points within that radius nearest first, each with `distanceMeters`.",
    params(PointQueryParams),
    responses(
        (status = 200, description = "All points; a search answers with `ProximityListResponse` instead", body = PointListResponse),
        (status = 400, description = "Invalid or partial search parameters", body = ErrorResponse),
    )
)]
pub async fn list_points(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PointQueryParams>,
) -> Result<Response, PointError> {
    match params.into_query()? {
        Some(query) => {
            let matches = state.proximity.search(&query).await?;
            let points = matches
                .iter()
                .map(ProximityResultDto::from_match)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Json(ProximityListResponse {
                count: points.len(),
                points,
            })
            .into_response())
        }
        None => {
            let points = state.point_store.list_all().await?;
            Ok(Json(list_response(&points)?).into_response())
        }
    }
}

/// `GET /points/geojson` — Same selection as `GET /points`, as a
/// GeoJSON `FeatureCollection`.
///
/// # Errors
///
/// Returns [`PointError`] on invalid search parameters, storage failure
/// or corrupt stored geometry.
#[utoipa::path(
    get,
    path = "/api/v1/points/geojson",
    tag = "Points",
    summary = "Points as GeoJSON",
    description = "Returns a FeatureCollection. Search results carry an extra `distanceMeters` property.",
    params(PointQueryParams),
    responses(
        (status = 200, description = "GeoJSON FeatureCollection", body = serde_json::Value),
        (status = 400, description = "Invalid or partial search parameters", body = ErrorResponse),
    )
)]
pub async fn points_geojson(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PointQueryParams>,
) -> Result<impl IntoResponse, PointError> {
    let collection = match params.into_query()? {
        Some(query) => {
            let matches = state.proximity.search(&query).await?;
            to_distance_collection(matches.iter().map(|m| (&m.point, m.distance_m)))?
        }
        None => {
            let points = state.point_store.list_all().await?;
            to_feature_collection(&points)?
        }
    };
    Ok(Json(collection))
}

/// `GET /points/mine` — The requester's own points.
///
/// # Errors
///
/// Returns [`PointError`] on missing identity or storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/points/mine",
    tag = "Points",
    summary = "List my points",
    params(("x-user-id" = String, Header, description = "Authenticated user UUID")),
    responses(
        (status = 200, description = "The requester's points", body = PointListResponse),
        (status = 401, description = "Missing or malformed requester", body = ErrorResponse),
    )
)]
pub async fn my_points(
    State(state): State<AppState>,
    Requester(owner): Requester,
) -> Result<impl IntoResponse, PointError> {
    let points = state.point_store.list_by_owner(owner).await?;
    Ok(Json(list_response(&points)?))
}

/// `GET /points/{id}` — One point.
///
/// # Errors
///
/// Returns [`PointError::NotFound`] if the point does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/points/{id}",
    tag = "Points",
    summary = "Get a point",
    params(("id" = PointId, Path, description = "Point identifier")),
    responses(
        (status = 200, description = "The point", body = PointResponse),
        (status = 400, description = "Malformed point id", body = ErrorResponse),
        (status = 404, description = "Point not found", body = ErrorResponse),
    )
)]
pub async fn get_point(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PointId>,
) -> Result<impl IntoResponse, PointError> {
    let point = state.point_store.get_by_id(id).await?;
    Ok(Json(PointResponse::from_point(&point)?))
}

/// `PUT`/`PATCH /points/{id}` — Partially update one of the requester's
/// points.
///
/// # Errors
///
/// Returns [`PointError::NotFound`], [`PointError::Forbidden`] or
/// [`PointError::Validation`] as appropriate.
#[utoipa::path(
    method(put, patch),
    path = "/api/v1/points/{id}",
    tag = "Points",
    summary = "Update a point",
    description = "Only the fields present in the body change. Moving the point recomputes its geometry.",
    params(
        ("id" = PointId, Path, description = "Point identifier"),
        ("x-user-id" = String, Header, description = "Authenticated user UUID"),
    ),
    request_body = UpdatePointRequest,
    responses(
        (status = 200, description = "Updated point", body = PointResponse),
        (status = 400, description = "Invalid patch values", body = ErrorResponse),
        (status = 401, description = "Missing or malformed requester", body = ErrorResponse),
        (status = 403, description = "Requester does not own the point", body = ErrorResponse),
        (status = 404, description = "Point not found", body = ErrorResponse),
    )
)]
pub async fn update_point(
    State(state): State<AppState>,
    Requester(requester): Requester,
    ApiPath(id): ApiPath<PointId>,
    ApiJson(req): ApiJson<UpdatePointRequest>,
) -> Result<impl IntoResponse, PointError> {
    let point = state.point_store.update(id, requester, req.into()).await?;
    tracing::info!(point_id = %id, %requester, "point updated");

    Ok(Json(PointResponse::from_point(&point)?))
}

/// `DELETE /points/{id}` — Delete one of the requester's points.
///
/// A point owned by someone else answers 404, like a missing one.
///
/// # Errors
///
/// Returns [`PointError::NotFound`] if nothing was deleted.
#[utoipa::path(
    delete,
    path = "/api/v1/points/{id}",
    tag = "Points",
    summary = "Delete a point",
    params(
        ("id" = PointId, Path, description = "Point identifier"),
        ("x-user-id" = String, Header, description = "Authenticated user UUID"),
    ),
    responses(
        (status = 204, description = "Point deleted"),
        (status = 401, description = "Missing or malformed requester", body = ErrorResponse),
        (status = 404, description = "Point not found or not owned by the requester", body = ErrorResponse),
    )
)]
pub async fn delete_point(
    State(state): State<AppState>,
    Requester(requester): Requester,
    ApiPath(id): ApiPath<PointId>,
) -> Result<impl IntoResponse, PointError> {
    state.point_store.delete(id, requester).await?;
    tracing::info!(point_id = %id, %requester, "point deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Point routes, relative to `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/points", get(list_points).post(create_point))
        .route("/points/geojson", get(points_geojson))
        .route("/points/mine", get(my_points))
        .route(
            "/points/{id}",
            get(get_point)
                .put(update_point)
                .patch(update_point)
                .delete(delete_point),
        )
}
