//! Durable address store contract
//!
//! The query orchestrator reaches durable storage only through
//! [`AddressStore`]. Every method takes a cancellation token and must give up
//! with [`RepositoryError::Cancelled`](crate::errors::RepositoryError) once it
//! fires.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::errors::RepositoryResult;
use crate::models::{Address, BoundingBox, GeocodeRequest};

/// Point, range and geohash lookups over persisted addresses
///
/// "No match" is `Ok(None)` or an empty vector, never an error.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Find an address by its store-assigned id
    async fn get_by_id(
        &self,
        id: i32,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Option<Address>>;

    /// Find the address matching all six postal fields
    async fn geocode(
        &self,
        request: &GeocodeRequest,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Option<Address>>;

    /// Find the address nearest to a coordinate, within the store's search radius
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Option<Address>>;

    /// All addresses inside a closed bounding box
    async fn query_by_bounding_box(
        &self,
        bbox: &BoundingBox,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Vec<Address>>;

    /// All addresses whose geohash starts with `prefix`
    async fn query_by_geohash_prefix(
        &self,
        prefix: &str,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Vec<Address>>;

    /// The address whose geohash equals `geohash`
    async fn query_by_geohash(
        &self,
        geohash: &str,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Option<Address>>;
}
