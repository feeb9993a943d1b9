//! Filesystem asset layers for petdeck.
//!
//! Pet images live in plain directory trees: a shared global library plus one
//! user layer per bucket nested beneath it (see [`AssetLayout`]). This crate
//! reads those trees and applies user-layer writes; merging the layers into a
//! catalog is `petdeck-catalog`'s job.
//!
//! # Design Rules
//!
//! 1. Every path built from caller input passes [`assert_contained`] before
//!    any filesystem call.
//! 2. The global library is never written; user actions shadow it.
//! 3. At most one image file exists per (type, level) in a layer.
//! 4. Soft deletes are marker files ([`tombstone`]) so they survive restarts.
//! 5. All I/O errors are propagated, never silently ignored, except for
//!    unreadable stage-name files which are logged and skipped.

pub mod error;
pub mod guard;
pub mod layer;
pub mod layout;
pub mod tombstone;
pub mod tree;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use guard::assert_contained;
pub use layer::UserLayer;
pub use layout::{AssetLayout, DEFAULT_URL_PREFIX, DEFAULT_USERS_DIR};
pub use tree::{scan_root, ScannedType, TypeMap};
