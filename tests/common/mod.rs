//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use geonimbus::{
    cache::SpatialIndex,
    config::{Config, DatabaseConfig},
    database::{Database, repositories::AddressSeaOrmRepository},
    geohash::Geohasher,
    models::{Address, NewAddress},
    services::GeoQueryOrchestrator,
    web::AppState,
};

/// Migrated in-memory SQLite; one connection so every query sees the same database
pub async fn memory_database() -> Database {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    let database = Database::new(&config).await.unwrap();
    database.migrate().await.unwrap();
    database
}

pub fn new_address(number: &str, latitude: f64, longitude: f64) -> NewAddress {
    NewAddress {
        zipcode: "62701".to_string(),
        number: number.to_string(),
        street: "Main St".to_string(),
        street2: None,
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        plus4: None,
        country: None,
        latitude,
        longitude,
        source: Some("fixture".to_string()),
        geohash: None,
    }
}

pub struct Fixture {
    pub database: Database,
    pub repository: Arc<AddressSeaOrmRepository>,
    pub cache: Arc<SpatialIndex>,
    pub orchestrator: Arc<GeoQueryOrchestrator>,
}

impl Fixture {
    pub async fn new() -> Self {
        let database = memory_database().await;
        let repository = Arc::new(AddressSeaOrmRepository::new(database.connection()));
        let cache = Arc::new(SpatialIndex::new());
        let orchestrator = Arc::new(GeoQueryOrchestrator::new(
            repository.clone(),
            cache.clone(),
            Arc::new(Geohasher),
        ));

        Self {
            database,
            repository,
            cache,
            orchestrator,
        }
    }

    pub async fn seed(&self, number: &str, latitude: f64, longitude: f64) -> Address {
        self.repository
            .insert(new_address(number, latitude, longitude))
            .await
            .unwrap()
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            orchestrator: self.orchestrator.clone(),
            database: self.database.clone(),
            config: Config::default(),
        }
    }
}
