//! Geohash encode/decode HTTP handlers

use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::errors::{AppError, GeoQueryError};
use crate::web::AppState;
use crate::web::handlers::{handle_error, ok, validate_coordinate};

#[derive(Debug, Deserialize)]
pub struct EncodeParams {
    pub latitude: f64,
    pub longitude: f64,
    pub precision: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DecodeParams {
    pub geohash: String,
}

/// GET /api/encode
pub async fn encode(State(state): State<AppState>, Query(params): Query<EncodeParams>) -> Response {
    if let Err(e) = validate_coordinate(params.latitude, params.longitude) {
        return handle_error(e);
    }

    let precision = params
        .precision
        .unwrap_or(state.config.geohash.default_precision);

    match state
        .orchestrator
        .codec()
        .encode(params.latitude, params.longitude, precision)
    {
        Ok(geohash) => ok(geohash),
        Err(e) => handle_error(AppError::validation(e.to_string())),
    }
}

/// GET /api/decode
pub async fn decode(State(state): State<AppState>, Query(params): Query<DecodeParams>) -> Response {
    match state.orchestrator.codec().decode(&params.geohash) {
        Ok(location) => ok(location),
        Err(e) => handle_error(AppError::Query(GeoQueryError::InvalidGeohash {
            geohash: params.geohash,
            message: e.to_string(),
        })),
    }
}
