//! Overlay resolution and catalog caching for petdeck.
//!
//! A bucket's catalog is the global pet library overlaid with the bucket's
//! legacy and current user layers, minus hidden types and tombstoned levels.
//! [`AssetService`] owns the layout, the [`CatalogCache`] and the per-bucket
//! locks, and is the single entry point the HTTP layer and CLI talk to.

pub mod cache;
pub mod error;
pub mod locks;
pub mod model;
pub mod overlay;
pub mod owner;
pub mod service;

pub use cache::{CatalogCache, DEFAULT_CACHE_TTL};
pub use error::{CatalogError, CatalogResult};
pub use locks::BucketLocks;
pub use model::{Catalog, CatalogEntry, LevelImages};
pub use overlay::{build_catalog, merge_user_layers};
pub use owner::resolve_bucket;
pub use service::AssetService;
