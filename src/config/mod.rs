//! Configuration for the pixel wall
//!
//! Provides types, discovery and loading for `pixeldrop.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
