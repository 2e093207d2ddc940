//! Catalog application library
//!
//! Book detail and book creation routes, mounted by the catalog HTTP server.

pub mod modules;
pub mod utils;

/// Re-export commonly used types
pub use modules::*;
