//! Repository pattern for the durable address store
//!
//! This module defines the storage contract the query orchestrator depends
//! on, keeping the cache-aside policy independent of the backing database.
//!
//! # Usage
//!
//! ```rust,ignore
//! use geonimbus::repositories::AddressStore;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn example(store: &dyn AddressStore) -> Result<(), Box<dyn std::error::Error>> {
//!     let token = CancellationToken::new();
//!     let address = store.get_by_id(42, &token).await?;
//!     Ok(())
//! }
//! ```

pub mod cancellation;
pub mod traits;

pub use cancellation::run_cancellable;
pub use traits::*;
