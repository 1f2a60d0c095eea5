//! Shared types for the Comanda suite
//!
//! Common types used across crates: floor-plan and reservation models,
//! wire DTOs with their Spanish REST field names, and push topic names.

pub mod events;
pub mod models;

// Re-exports
pub use events::Topic;
pub use models::{
    OrderRef, ReservationHint, SavePositionsRequest, Table, TableCreate, TablePlacement,
    TableStatus, TableUpdate,
};
