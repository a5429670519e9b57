//! Geocoding HTTP handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::{AppError, GeoQueryResult};
use crate::models::{Address, BoundingBox, Coordinate, DEFAULT_COUNTRY, GeocodeRequest};
use crate::web::AppState;
use crate::web::handlers::{
    RequestDeadline, handle_error, ok, validate_bounding_box, validate_coordinate,
    validate_radius,
};

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    pub zipcode: String,
    pub number: String,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

impl From<GeocodeParams> for GeocodeRequest {
    fn from(params: GeocodeParams) -> Self {
        Self {
            zipcode: params.zipcode,
            number: params.number,
            street: params.street,
            city: params.city,
            state: params.state,
            country: params.country,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CoordinateParams {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBoxParams {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct RadiusParams {
    pub latitude: f64,
    pub longitude: f64,
    /// Kilometres
    pub radius: f64,
}

#[derive(Debug, Deserialize)]
pub struct GeohashParams {
    pub geohash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeohashPrefixParams {
    pub geohash_prefix: String,
}

/// GET /geocode/id/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let deadline = RequestDeadline::start(state.request_timeout());
    let result = state.orchestrator.get_by_id(id, deadline.token()).await;
    single(result, "Address", &id.to_string())
}

/// GET /geocode/geocode
pub async fn geocode(
    State(state): State<AppState>,
    Query(params): Query<GeocodeParams>,
) -> Response {
    let request = GeocodeRequest::from(params);
    let deadline = RequestDeadline::start(state.request_timeout());
    let result = state.orchestrator.geocode(&request, deadline.token()).await;
    single(result, "Address", &request.cache_key())
}

/// GET /geocode/reverse-geocode
pub async fn reverse_geocode(
    State(state): State<AppState>,
    Query(params): Query<CoordinateParams>,
) -> Response {
    if let Err(e) = validate_coordinate(params.latitude, params.longitude) {
        return handle_error(e);
    }

    let deadline = RequestDeadline::start(state.request_timeout());
    let result = state
        .orchestrator
        .reverse_geocode(params.latitude, params.longitude, deadline.token())
        .await;
    single(
        result,
        "Address",
        &format!("{},{}", params.latitude, params.longitude),
    )
}

/// POST /geocode/reverse-geocode/batch
pub async fn batch_reverse_geocode(
    State(state): State<AppState>,
    Json(coordinates): Json<Vec<Coordinate>>,
) -> Response {
    for coordinate in &coordinates {
        if let Err(e) = validate_coordinate(coordinate.latitude, coordinate.longitude) {
            return handle_error(e);
        }
    }

    debug!(count = coordinates.len(), "Batch reverse geocode");
    let deadline = RequestDeadline::start(state.request_timeout());
    let result = state
        .orchestrator
        .batch_reverse_geocode(&coordinates, deadline.token())
        .await;
    list(result)
}

/// GET /geocode/bbox
pub async fn bounding_box(
    State(state): State<AppState>,
    Query(params): Query<BoundingBoxParams>,
) -> Response {
    let bbox = BoundingBox::new(params.min_lat, params.max_lat, params.min_lon, params.max_lon);
    if let Err(e) = validate_bounding_box(&bbox) {
        return handle_error(e);
    }

    let deadline = RequestDeadline::start(state.request_timeout());
    let result = state
        .orchestrator
        .query_by_bounding_box(&bbox, deadline.token())
        .await;
    list(result)
}

/// GET /geocode/radius
pub async fn radius(
    State(state): State<AppState>,
    Query(params): Query<RadiusParams>,
) -> Response {
    if let Err(e) = validate_coordinate(params.latitude, params.longitude)
        .and_then(|_| validate_radius(params.radius))
    {
        return handle_error(e);
    }

    let deadline = RequestDeadline::start(state.request_timeout());
    let result = state
        .orchestrator
        .query_by_radius(
            params.latitude,
            params.longitude,
            params.radius,
            deadline.token(),
        )
        .await;
    list(result)
}

/// GET /geocode/geohash
pub async fn geohash(
    State(state): State<AppState>,
    Query(params): Query<GeohashParams>,
) -> Response {
    let deadline = RequestDeadline::start(state.request_timeout());
    let result = state
        .orchestrator
        .query_by_geohash(&params.geohash, deadline.token())
        .await;
    single(result, "Geohash", &params.geohash)
}

/// GET /geocode/geohash-prefix
///
/// Unlike the other range queries an empty result is a 404.
pub async fn geohash_prefix(
    State(state): State<AppState>,
    Query(params): Query<GeohashPrefixParams>,
) -> Response {
    if params.geohash_prefix.is_empty() {
        return handle_error(AppError::validation("geohashPrefix must not be empty"));
    }

    let deadline = RequestDeadline::start(state.request_timeout());
    match state
        .orchestrator
        .query_by_geohash_prefix(&params.geohash_prefix, deadline.token())
        .await
    {
        Ok(addresses) if addresses.is_empty() => handle_error(AppError::not_found(
            "Geohash prefix",
            params.geohash_prefix,
        )),
        Ok(addresses) => ok(addresses),
        Err(e) => handle_error(e.into()),
    }
}

/// GET /geocode/nearest
///
/// Answered from the in-memory cache only.
pub async fn nearest(
    State(state): State<AppState>,
    Query(params): Query<CoordinateParams>,
) -> Response {
    if let Err(e) = validate_coordinate(params.latitude, params.longitude) {
        return handle_error(e);
    }

    let deadline = RequestDeadline::start(state.request_timeout());
    let result = state
        .orchestrator
        .nearest_cached(params.latitude, params.longitude, deadline.token());
    single(
        result,
        "Cached address",
        &format!("{},{}", params.latitude, params.longitude),
    )
}

fn single(result: GeoQueryResult<Option<Address>>, resource: &str, id: &str) -> Response {
    match result {
        Ok(Some(address)) => ok(address),
        Ok(None) => handle_error(AppError::not_found(resource, id)),
        Err(e) => handle_error(e.into()),
    }
}

fn list(result: GeoQueryResult<Vec<Address>>) -> Response {
    match result {
        Ok(addresses) => ok(addresses),
        Err(e) => handle_error(e.into()),
    }
}
