pub mod geo;

pub use geo::{haversine_distance, search_window, search_windows};
