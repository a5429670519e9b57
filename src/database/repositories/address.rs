//! SeaORM-based address repository
//!
//! Durable store behind the spatial cache. Spatial predicates are expressed
//! as plain lat/lon ranges so the same queries run on SQLite, PostgreSQL and
//! MySQL; the reverse-geocode distance ranking is done in Rust.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::entities::{addresses, prelude::Addresses};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::geohash::{DEFAULT_PRECISION, GeohashCodec, Geohasher};
use crate::models::{Address, BoundingBox, DEFAULT_COUNTRY, GeocodeRequest, NewAddress};
use crate::repositories::{AddressStore, run_cancellable};
use crate::utils::{haversine_distance, search_windows};

/// Reverse geocoding only matches addresses this close to the query point
pub const REVERSE_GEOCODE_RADIUS_M: f64 = 50.0;

/// SeaORM-based repository for address lookups
pub struct AddressSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
    codec: Arc<dyn GeohashCodec>,
}

impl AddressSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self::with_codec(connection, Arc::new(Geohasher))
    }

    pub fn with_codec(connection: Arc<DatabaseConnection>, codec: Arc<dyn GeohashCodec>) -> Self {
        Self { connection, codec }
    }

    /// Persist a new address, filling in its geohash when the caller left it out
    pub async fn insert(&self, new_address: NewAddress) -> RepositoryResult<Address> {
        let geohash = match new_address.geohash {
            Some(geohash) => geohash,
            None => self
                .codec
                .encode(new_address.latitude, new_address.longitude, DEFAULT_PRECISION)
                .map_err(|e| RepositoryError::InvalidRecord {
                    id: 0,
                    message: e.to_string(),
                })?,
        };

        let active_model = addresses::ActiveModel {
            zipcode: Set(new_address.zipcode),
            number: Set(new_address.number),
            street: Set(new_address.street),
            street2: Set(new_address.street2),
            city: Set(new_address.city),
            state: Set(new_address.state),
            plus4: Set(new_address.plus4),
            country: Set(new_address
                .country
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string())),
            latitude: Set(new_address.latitude),
            longitude: Set(new_address.longitude),
            source: Set(new_address.source),
            geohash: Set(Some(geohash)),
            ..Default::default()
        };

        let model = active_model
            .insert(&*self.connection)
            .await
            .map_err(classify_db_error)?;
        debug!(id = model.id, "Inserted address");
        Ok(model_to_domain(model))
    }

    async fn find_nearest_within(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Option<Address>, RepositoryError> {
        // Windows crossing the antimeridian arrive as two boxes
        let window = search_windows(latitude, longitude, radius_m).into_iter().fold(
            Condition::any(),
            |condition, window| {
                condition.add(
                    Condition::all()
                        .add(addresses::Column::Latitude.between(window.min_lat, window.max_lat))
                        .add(addresses::Column::Longitude.between(window.min_lon, window.max_lon)),
                )
            },
        );
        let candidates = Addresses::find()
            .filter(window)
            .all(&*self.connection)
            .await
            .map_err(classify_db_error)?;

        let nearest = candidates
            .into_iter()
            .map(|model| {
                let distance =
                    haversine_distance(latitude, longitude, model.latitude, model.longitude);
                (distance, model)
            })
            .filter(|(distance, _)| *distance <= radius_m)
            .min_by(|(a, _), (b, _)| a.total_cmp(b));

        Ok(nearest.map(|(_, model)| model_to_domain(model)))
    }
}

#[async_trait]
impl AddressStore for AddressSeaOrmRepository {
    async fn get_by_id(
        &self,
        id: i32,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Option<Address>> {
        let query = async {
            Addresses::find_by_id(id)
                .one(&*self.connection)
                .await
                .map_err(classify_db_error)
        };
        let model = run_cancellable("get_by_id", cancel, query).await?;
        Ok(model.map(model_to_domain))
    }

    async fn geocode(
        &self,
        request: &GeocodeRequest,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Option<Address>> {
        let query = async {
            Addresses::find()
                .filter(addresses::Column::Zipcode.eq(request.zipcode.as_str()))
                .filter(addresses::Column::Number.eq(request.number.as_str()))
                .filter(addresses::Column::Street.eq(request.street.as_str()))
                .filter(addresses::Column::City.eq(request.city.as_str()))
                .filter(addresses::Column::State.eq(request.state.as_str()))
                .filter(addresses::Column::Country.eq(request.country.as_str()))
                .order_by_asc(addresses::Column::Id)
                .one(&*self.connection)
                .await
                .map_err(classify_db_error)
        };
        let model = run_cancellable("geocode", cancel, query).await?;
        Ok(model.map(model_to_domain))
    }

    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Option<Address>> {
        run_cancellable(
            "reverse_geocode",
            cancel,
            self.find_nearest_within(latitude, longitude, REVERSE_GEOCODE_RADIUS_M),
        )
        .await
    }

    async fn query_by_bounding_box(
        &self,
        bbox: &BoundingBox,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Vec<Address>> {
        let query = async {
            Addresses::find()
                .filter(addresses::Column::Latitude.between(bbox.min_lat, bbox.max_lat))
                .filter(addresses::Column::Longitude.between(bbox.min_lon, bbox.max_lon))
                .all(&*self.connection)
                .await
                .map_err(classify_db_error)
        };
        let models = run_cancellable("query_by_bounding_box", cancel, query).await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn query_by_geohash_prefix(
        &self,
        prefix: &str,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Vec<Address>> {
        let query = async {
            Addresses::find()
                .filter(addresses::Column::Geohash.starts_with(prefix))
                .all(&*self.connection)
                .await
                .map_err(classify_db_error)
        };
        let models = run_cancellable("query_by_geohash_prefix", cancel, query).await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn query_by_geohash(
        &self,
        geohash: &str,
        cancel: &CancellationToken,
    ) -> RepositoryResult<Option<Address>> {
        let query = async {
            Addresses::find()
                .filter(addresses::Column::Geohash.eq(geohash))
                .order_by_asc(addresses::Column::Id)
                .one(&*self.connection)
                .await
                .map_err(classify_db_error)
        };
        let model = run_cancellable("query_by_geohash", cancel, query).await?;
        Ok(model.map(model_to_domain))
    }
}

/// Separate pool/connection failures from query errors
fn classify_db_error(error: DbErr) -> RepositoryError {
    match error {
        DbErr::Conn(e) => RepositoryError::ConnectionFailed {
            message: e.to_string(),
        },
        DbErr::ConnectionAcquire(e) => RepositoryError::ConnectionFailed {
            message: e.to_string(),
        },
        other => RepositoryError::Database(other),
    }
}

fn model_to_domain(model: addresses::Model) -> Address {
    Address {
        id: model.id,
        zipcode: model.zipcode,
        number: model.number,
        street: model.street,
        street2: model.street2,
        city: model.city,
        state: model.state,
        plus4: model.plus4,
        country: if model.country.is_empty() {
            DEFAULT_COUNTRY.to_string()
        } else {
            model.country
        },
        latitude: model.latitude,
        longitude: model.longitude,
        source: model.source,
        geohash: model.geohash,
    }
}
