pub mod address;

pub use address::{
    Address, BoundingBox, Coordinate, DEFAULT_COUNTRY, GeocodeRequest, Location, NewAddress,
    is_valid_coordinate,
};
