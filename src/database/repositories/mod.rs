//! SeaORM repository implementations

pub mod address;

pub use address::{AddressSeaOrmRepository, REVERSE_GEOCODE_RADIUS_M};
