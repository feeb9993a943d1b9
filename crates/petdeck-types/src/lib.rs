//! Foundation types for petdeck.
//!
//! Every other petdeck crate depends on `petdeck-types`.
//!
//! # Key Types
//!
//! - [`PetTypeId`] — sanitized pet type identifier
//! - [`Bucket`] — isolation namespace owning one user layer
//! - [`Level`] / [`AssetLimits`] — validated level and the product caps
//! - [`ImageFormat`] — the five recognized image extensions
//! - [`Member`] — account record from the external auth subsystem

pub mod error;
pub mod image;
pub mod level;
pub mod member;
pub mod name;

pub use error::TypeError;
pub use image::ImageFormat;
pub use level::{AssetLimits, Level};
pub use member::Member;
pub use name::{sanitize_name, Bucket, PetTypeId, OFFLINE_BUCKET};
