//! In-memory spatial cache
//!
//! [`SpatialIndex`] holds address records keyed by string and indexed by
//! location. It is constructed once at startup and shared behind an `Arc`.

pub mod spatial_index;

pub use spatial_index::SpatialIndex;
