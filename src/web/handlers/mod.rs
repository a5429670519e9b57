//! Web handlers module
//!
//! HTTP request handlers organized by domain. Handlers stay thin: they
//! validate input, attach a request deadline and delegate to the query
//! orchestrator.

pub mod geocode;
pub mod geohash;
pub mod management;

pub use crate::web::responses::*;
pub use crate::web::utils::*;
