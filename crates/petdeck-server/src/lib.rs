//! HTTP server for petdeck.
//!
//! Exposes the per-caller pet image catalog and its mutations under
//! `/api/pet-images`. Identity comes from an external [`MemberDirectory`];
//! resolved image URLs are served by a separate static file server.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{Credentials, MemberDirectory, StaticMembers};
pub use config::{AssetConfig, MemberRecord, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::PetdeckServer;
pub use state::AppState;
