//! Data models
//!
//! Shared between the edge server and the sync client (via API).
//! All IDs are `i64`.

pub mod reservation;
pub mod table;

// Re-exports
pub use reservation::*;
pub use table::*;
