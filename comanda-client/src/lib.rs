//! Comanda Client - live synchronization core for the floor view
//!
//! Keeps a local, editable copy of the restaurant floor plan consistent
//! with the server. Three refresh sources feed one cancellable load
//! operation (manual reloads, an interval poll, and a server-push event
//! channel); last-write-wins commit gating guarantees the working copy
//! never regresses to a stale response. Layout edits stay local until the
//! batched position save persists them.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod floor;
pub mod http;
pub mod nav;
pub mod poll;
pub mod runner;
pub mod validate;

pub use api::{FloorApi, HttpApi};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use events::{ChannelOptions, SseEvent, Subscription};
pub use floor::{
    ErrorSurface, FloorPlanEditor, FloorSnapshot, FloorSync, FloorSyncOptions, ReloadPolicy,
    TableView, TapAction,
};
pub use http::HttpClient;
pub use poll::{PollOptions, PollScheduler};
pub use runner::{RunnerOptions, TaskRunner, TaskSnapshot};

// Re-export shared types so callers rarely need the shared crate directly
pub use shared::{
    OrderRef, ReservationHint, SavePositionsRequest, Table, TableCreate, TablePlacement,
    TableStatus, TableUpdate, Topic,
};
