//! Spatial layout editor
//!
//! Owns the working copy of the floor plan and reconciles it against loads
//! from every refresh source. Loads go through a cancellable task runner,
//! so a stale response can never overwrite a newer one; what a committed
//! load does to unsaved local edits is decided by [`ReloadPolicy`].

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::api::FloorApi;
use crate::floor::chip::{TableView, chip_for_capacity, normalized_rotation};
use crate::floor::geometry::{Point, ZoneFrame, compute_drop_position, find_zone};
use crate::runner::{RunnerOptions, TaskRunner, TaskSnapshot};
use crate::{ClientResult, validate};
use shared::{
    ReservationHint, SavePositionsRequest, Table, TableCreate, TablePlacement, TableUpdate,
};

/// What a committed load does to unsaved local edits.
///
/// The floor view historically replaced the working copy wholesale on every
/// load, including loads triggered by push events mid-edit. Whether that is
/// wanted is a product decision, so it is an explicit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadPolicy {
    /// Server truth wins: every committed load replaces the working copy,
    /// discarding unsaved edits
    #[default]
    ReplaceAlways,
    /// A dirty session keeps its working copy; loads replace it only while
    /// clean
    KeepWhileDirty,
}

/// Payload of one successful load
#[derive(Debug, Clone, PartialEq)]
pub struct FloorSnapshot {
    pub tables: Vec<Table>,
    pub reservations: Vec<ReservationHint>,
}

/// Working copy of one editing session. Never persisted; lost on teardown.
#[derive(Debug, Clone, Default)]
pub struct SyncEnvelope {
    /// Unsaved local edits exist
    pub dirty: bool,
    pub tables: Vec<Table>,
    pub last_loaded_at: Option<DateTime<Utc>>,
}

/// How a load failure should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSurface {
    /// Nothing was ever loaded: block the view behind a retry screen
    BlockingRetry,
    /// Stale data is on screen: show an inline banner over it
    InlineBanner,
}

#[derive(Debug, Default)]
struct EditorInner {
    envelope: SyncEnvelope,
    reservations: Vec<ReservationHint>,
    zones: Vec<ZoneFrame>,
    /// Generation of the newest load applied to this session
    applied_load: u64,
}

/// Floor plan editor and its load/save machinery
pub struct FloorPlanEditor {
    api: Arc<dyn FloorApi>,
    runner: TaskRunner<FloorSnapshot>,
    policy: ReloadPolicy,
    inner: Mutex<EditorInner>,
    /// Cancels writes still in flight when the editor is torn down
    lifetime: CancellationToken,
}

impl FloorPlanEditor {
    pub fn new(api: Arc<dyn FloorApi>, policy: ReloadPolicy) -> Self {
        let runner = {
            let api = api.clone();
            TaskRunner::new(
                move |cancel| {
                    let api = api.clone();
                    async move {
                        let (tables, reservations) = tokio::try_join!(
                            api.list_tables(&cancel),
                            api.upcoming_reservations(&cancel),
                        )?;
                        Ok(FloorSnapshot {
                            tables,
                            reservations,
                        })
                    }
                },
                RunnerOptions::default(),
            )
        };

        Self {
            api,
            runner,
            policy,
            inner: Mutex::new(EditorInner::default()),
            lifetime: CancellationToken::new(),
        }
    }

    // ========== Loading ==========

    /// Reload tables and reservations from the server.
    ///
    /// Concurrent calls race through the task runner: only the newest one
    /// commits. Returns true when this call's load replaced the working
    /// copy.
    pub async fn refresh(&self) -> bool {
        match self.runner.run_with_generation().await {
            Some((generation, snapshot)) => self.apply(generation, snapshot),
            None => false,
        }
    }

    fn apply(&self, generation: u64, snapshot: FloorSnapshot) -> bool {
        let mut inner = self.inner.lock().unwrap();
        // Overlapping refreshes can reach this point out of commit order;
        // only a snapshot newer than the last applied one may land.
        if generation <= inner.applied_load {
            tracing::trace!(generation, "stale load discarded");
            return false;
        }
        inner.applied_load = generation;

        // Reservations are a display overlay, never edited locally; they
        // update regardless of policy.
        inner.reservations = snapshot.reservations;

        if self.policy == ReloadPolicy::KeepWhileDirty && inner.envelope.dirty {
            tracing::debug!("load skipped: session has unsaved edits");
            return false;
        }
        inner.envelope.tables = snapshot.tables;
        inner.envelope.dirty = false;
        inner.envelope.last_loaded_at = Some(Utc::now());
        true
    }

    /// Loading flag and last committed error of the load operation
    pub fn load_state(&self) -> TaskSnapshot<FloorSnapshot> {
        self.runner.snapshot()
    }

    /// How the current load error, if any, should be presented
    pub fn error_surface(&self) -> Option<ErrorSurface> {
        let state = self.runner.snapshot();
        state.error.as_ref()?;
        let loaded = self.inner.lock().unwrap().envelope.last_loaded_at.is_some();
        Some(if loaded {
            ErrorSurface::InlineBanner
        } else {
            ErrorSurface::BlockingRetry
        })
    }

    // ========== Working copy ==========

    pub fn tables(&self) -> Vec<Table> {
        self.inner.lock().unwrap().envelope.tables.clone()
    }

    pub fn reservations(&self) -> Vec<ReservationHint> {
        self.inner.lock().unwrap().reservations.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.lock().unwrap().envelope.dirty
    }

    /// Whether the save affordance should be enabled
    pub fn can_save(&self) -> bool {
        self.is_dirty()
    }

    pub fn last_loaded_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().unwrap().envelope.last_loaded_at
    }

    /// Render contracts for every table, reservation badges joined by id
    pub fn views(&self) -> Vec<TableView> {
        let inner = self.inner.lock().unwrap();
        inner
            .envelope
            .tables
            .iter()
            .map(|table| {
                let hint = inner.reservations.iter().find(|r| r.mesa_id == table.id);
                TableView::build(table, hint)
            })
            .collect()
    }

    /// Record the zones' measured canvas rectangles after a layout pass
    pub fn set_zone_frames(&self, zones: Vec<ZoneFrame>) {
        self.inner.lock().unwrap().zones = zones;
    }

    // ========== Editing ==========

    /// Drag release: place the table under the pointer, or revert it to
    /// unplaced when the drop missed every zone. Marks the session dirty.
    pub fn drag_end(&self, table_id: i64, pointer: Point) -> Option<TablePlacement> {
        let mut inner = self.inner.lock().unwrap();
        let hit = find_zone(pointer, &inner.zones).map(|zone| (zone.name.clone(), zone.rect));

        let placement = {
            let table = inner
                .envelope
                .tables
                .iter_mut()
                .find(|t| t.id == table_id)?;
            match hit {
                Some((zona, rect)) => {
                    let chip = chip_for_capacity(table.capacidad);
                    let position = compute_drop_position(pointer, rect, chip);
                    table.zona = Some(zona);
                    table.pos_x = Some(position.x);
                    table.pos_y = Some(position.y);
                }
                None => {
                    table.zona = None;
                    table.pos_x = None;
                    table.pos_y = None;
                    table.rotacion = 0;
                }
            }
            table.placement()
        };

        inner.envelope.dirty = true;
        Some(placement)
    }

    /// Rotate a large table by 90 degrees. Small tables ignore the request
    /// without dirtying the session. Returns the rotation after the call.
    pub fn rotate_table(&self, table_id: i64) -> Option<i32> {
        let mut inner = self.inner.lock().unwrap();
        let rotated = {
            let table = inner
                .envelope
                .tables
                .iter_mut()
                .find(|t| t.id == table_id)?;
            if !table.can_rotate() {
                return Some(normalized_rotation(table.rotacion));
            }
            table.rotacion = (normalized_rotation(table.rotacion) + 90) % 360;
            table.rotacion
        };
        inner.envelope.dirty = true;
        Some(rotated)
    }

    /// Take the table off the floor back into the unplaced tray. Not a
    /// delete: the table itself survives.
    pub fn remove_from_zone(&self, table_id: i64) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let cleared = match inner
            .envelope
            .tables
            .iter_mut()
            .find(|t| t.id == table_id)
        {
            Some(table) => {
                table.zona = None;
                table.pos_x = None;
                table.pos_y = None;
                table.rotacion = 0;
                true
            }
            None => false,
        };
        if cleared {
            inner.envelope.dirty = true;
        }
        cleared
    }

    // ========== Persistence ==========

    /// The batch a save would send: every table's placement, explicit
    /// nulls for unplaced ones
    pub fn pending_batch(&self) -> SavePositionsRequest {
        let inner = self.inner.lock().unwrap();
        SavePositionsRequest {
            posiciones: inner.envelope.tables.iter().map(Table::placement).collect(),
        }
    }

    /// Persist every placement in one batch. On success the session is
    /// clean again; on failure the working copy and the dirty flag stay
    /// untouched so the save can simply be retried.
    pub async fn save_positions(&self) -> ClientResult<()> {
        let batch = self.pending_batch();
        self.api.save_positions(&batch, &self.lifetime).await?;
        self.inner.lock().unwrap().envelope.dirty = false;
        tracing::info!(tables = batch.posiciones.len(), "floor positions saved");
        Ok(())
    }

    // ========== Table CRUD ==========
    //
    // Pass-throughs with client-side validation. The working copy picks
    // the change up on the next load; the server broadcasts one.

    pub async fn create_table(&self, payload: TableCreate) -> ClientResult<Table> {
        validate::table_create(&payload)?;
        self.api.create_table(&payload, &self.lifetime).await
    }

    pub async fn update_table(&self, id: i64, payload: TableUpdate) -> ClientResult<Table> {
        validate::table_update(&payload)?;
        self.api.update_table(id, &payload, &self.lifetime).await
    }

    pub async fn delete_table(&self, id: i64) -> ClientResult<()> {
        self.api.delete_table(id, &self.lifetime).await
    }
}

impl Drop for FloorPlanEditor {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

impl std::fmt::Debug for FloorPlanEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloorPlanEditor")
            .field("policy", &self.policy)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}
