//! Floor plan: geometry, chip contracts, the editor and its sync service

pub mod chip;
pub mod editor;
pub mod geometry;
pub mod sync;

pub use chip::{
    LARGE_CHIP, ReservationBadge, SMALL_CHIP, TableView, TapAction, chip_for_capacity,
    normalized_rotation, oriented_box, tap_action,
};
pub use editor::{ErrorSurface, FloorPlanEditor, FloorSnapshot, ReloadPolicy, SyncEnvelope};
pub use geometry::{
    ChipSize, Point, Position, Rect, ZoneFrame, compute_drop_position, find_zone, hit_test_zone,
};
pub use sync::{FloorSync, FloorSyncOptions};
