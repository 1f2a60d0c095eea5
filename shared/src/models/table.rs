//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table status, owned by the order-lifecycle collaborator.
///
/// The sync core reads it (navigation decisions) but never writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Free,
    Occupied,
    Reserved,
}

/// Opaque reference to an order surfaced by the order collaborator.
///
/// Only the id is guaranteed; extra fields on the wire are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
}

/// Dining table entity as served by `GET /mesas?activa=true`.
///
/// Placement is all-or-nothing: `zona`, `pos_x` and `pos_y` are either all
/// set (placed) or all `None` (unplaced). `rotacion` is stored for every
/// table but only interpreted for `capacidad >= 6`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: i64,
    /// Display number, unique per tenant.
    pub numero: i32,
    pub capacidad: i32,
    pub estado: TableStatus,
    #[serde(default)]
    pub zona: Option<String>,
    #[serde(default)]
    pub pos_x: Option<i32>,
    #[serde(default)]
    pub pos_y: Option<i32>,
    #[serde(default)]
    pub rotacion: i32,
    #[serde(default)]
    pub pedidos: Vec<OrderRef>,
}

impl Table {
    /// Whether the table currently sits in a zone.
    pub fn is_placed(&self) -> bool {
        self.zona.is_some()
    }

    /// Tables with capacity >= 6 render as elongated rectangles and may
    /// be rotated; smaller tables are square and ignore rotation.
    pub fn can_rotate(&self) -> bool {
        self.capacidad >= 6
    }

    /// The order currently open on this table, if any.
    pub fn active_order(&self) -> Option<&OrderRef> {
        self.pedidos.first()
    }

    /// Snapshot of this table's placement for the batched save.
    pub fn placement(&self) -> TablePlacement {
        TablePlacement {
            id: self.id,
            zona: self.zona.clone(),
            pos_x: self.pos_x,
            pos_y: self.pos_y,
            rotacion: self.rotacion,
        }
    }
}

/// Create dining table payload (`POST /mesas`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCreate {
    pub numero: i32,
    pub capacidad: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zona: Option<String>,
}

/// Update dining table payload (`PUT /mesas/:id`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacidad: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activa: Option<bool>,
}

/// One entry of the batched position save.
///
/// Unplaced tables serialize explicit nulls for `zona`/`posX`/`posY`, so
/// no field here skips serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePlacement {
    pub id: i64,
    pub zona: Option<String>,
    pub pos_x: Option<i32>,
    pub pos_y: Option<i32>,
    pub rotacion: i32,
}

/// Batched save request body (`PATCH /mesas/posiciones`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePositionsRequest {
    pub posiciones: Vec<TablePlacement>,
}
