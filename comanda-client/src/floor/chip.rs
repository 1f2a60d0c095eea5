//! Chip sizing, rotation and tap dispatch
//!
//! Render contracts for one table chip: its footprint by capacity, the box
//! it occupies once rotation is applied, and what a tap on it does.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::floor::geometry::{ChipSize, Position};
use shared::{OrderRef, ReservationHint, Table, TableStatus};

/// Footprint for small, square tables
pub const SMALL_CHIP: ChipSize = ChipSize {
    width: 56,
    height: 56,
};

/// Footprint for large, elongated tables (capacity 6 and up)
pub const LARGE_CHIP: ChipSize = ChipSize {
    width: 100,
    height: 48,
};

/// Footprint for a table of the given capacity
pub fn chip_for_capacity(capacidad: i32) -> ChipSize {
    if capacidad >= 6 { LARGE_CHIP } else { SMALL_CHIP }
}

/// Rotation folded into one of 0, 90, 180, 270
pub fn normalized_rotation(rotacion: i32) -> i32 {
    rotacion.rem_euclid(360) / 90 * 90
}

/// Box a table's chip occupies in the layout.
///
/// Rotations of 90 and 270 swap width and height. Small tables are square
/// and never rotate, so their box is always the plain footprint.
pub fn oriented_box(table: &Table) -> ChipSize {
    let chip = chip_for_capacity(table.capacidad);
    if table.can_rotate() && matches!(normalized_rotation(table.rotacion), 90 | 270) {
        ChipSize {
            width: chip.height,
            height: chip.width,
        }
    } else {
        chip
    }
}

/// What tapping a table chip does, decided solely by its status
#[derive(Debug, Clone, PartialEq)]
pub enum TapAction {
    /// Start a new order on this table
    NewOrder,
    /// Open the table's active order
    OpenOrder(OrderRef),
}

/// Tap dispatch: an occupied table with an active order opens it, anything
/// else (free, reserved, or occupied with no order attached) starts a new
/// order.
pub fn tap_action(table: &Table) -> TapAction {
    match (table.estado, table.active_order()) {
        (TableStatus::Occupied, Some(order)) => TapAction::OpenOrder(order.clone()),
        _ => TapAction::NewOrder,
    }
}

/// Reservation badge content for a chip's tooltip
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationBadge {
    pub fecha_hora: DateTime<Utc>,
    pub cliente_nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personas: Option<i32>,
}

impl From<&ReservationHint> for ReservationBadge {
    fn from(hint: &ReservationHint) -> Self {
        Self {
            fecha_hora: hint.fecha_hora,
            cliente_nombre: hint.cliente_nombre.clone(),
            personas: hint.personas,
        }
    }
}

/// Everything the floor view needs to render one table chip
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub id: i64,
    pub numero: i32,
    pub capacidad: i32,
    pub estado: TableStatus,
    pub zona: Option<String>,
    /// `None` renders in the unplaced tray
    pub position: Option<Position>,
    /// Normalized; always 0 for small tables
    pub rotacion: i32,
    /// Unrotated footprint
    pub chip: ChipSize,
    /// Footprint with rotation applied
    pub container: ChipSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<ReservationBadge>,
}

impl TableView {
    pub fn build(table: &Table, reservation: Option<&ReservationHint>) -> Self {
        let position = match (table.pos_x, table.pos_y) {
            (Some(x), Some(y)) => Some(Position { x, y }),
            _ => None,
        };
        Self {
            id: table.id,
            numero: table.numero,
            capacidad: table.capacidad,
            estado: table.estado,
            zona: table.zona.clone(),
            position,
            rotacion: if table.can_rotate() {
                normalized_rotation(table.rotacion)
            } else {
                0
            },
            chip: chip_for_capacity(table.capacidad),
            container: oriented_box(table),
            reservation: reservation.map(ReservationBadge::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(capacidad: i32, rotacion: i32) -> Table {
        Table {
            id: 1,
            numero: 1,
            capacidad,
            estado: TableStatus::Free,
            zona: Some("Interior".to_string()),
            pos_x: Some(100),
            pos_y: Some(100),
            rotacion,
            pedidos: Vec::new(),
        }
    }

    #[test]
    fn test_chip_size_by_capacity() {
        assert_eq!(chip_for_capacity(2), SMALL_CHIP);
        assert_eq!(chip_for_capacity(5), SMALL_CHIP);
        assert_eq!(chip_for_capacity(6), LARGE_CHIP);
        assert_eq!(chip_for_capacity(12), LARGE_CHIP);
    }

    #[test]
    fn test_rotation_swaps_large_chip_box() {
        assert_eq!(oriented_box(&table(8, 0)), LARGE_CHIP);
        assert_eq!(
            oriented_box(&table(8, 90)),
            ChipSize {
                width: 48,
                height: 100
            }
        );
        assert_eq!(oriented_box(&table(8, 180)), LARGE_CHIP);
        assert_eq!(
            oriented_box(&table(8, 270)),
            ChipSize {
                width: 48,
                height: 100
            }
        );
    }

    #[test]
    fn test_small_tables_ignore_rotation() {
        assert_eq!(oriented_box(&table(4, 90)), SMALL_CHIP);
    }

    #[test]
    fn test_normalized_rotation_folds() {
        assert_eq!(normalized_rotation(0), 0);
        assert_eq!(normalized_rotation(360), 0);
        assert_eq!(normalized_rotation(450), 90);
        assert_eq!(normalized_rotation(-90), 270);
        assert_eq!(normalized_rotation(95), 90);
    }

    #[test]
    fn test_tap_occupied_with_order_opens_it() {
        let mut t = table(4, 0);
        t.estado = TableStatus::Occupied;
        t.pedidos = vec![OrderRef {
            id: 42,
            estado: Some("ABIERTO".to_string()),
        }];

        match tap_action(&t) {
            TapAction::OpenOrder(order) => assert_eq!(order.id, 42),
            other => panic!("expected OpenOrder, got {other:?}"),
        }
    }

    #[test]
    fn test_tap_free_and_reserved_start_new_order() {
        let mut t = table(4, 0);
        assert_eq!(tap_action(&t), TapAction::NewOrder);

        t.estado = TableStatus::Reserved;
        assert_eq!(tap_action(&t), TapAction::NewOrder);

        // Occupied but with no order attached still starts a new one.
        t.estado = TableStatus::Occupied;
        assert_eq!(tap_action(&t), TapAction::NewOrder);
    }

    #[test]
    fn test_view_of_unplaced_table() {
        let mut t = table(6, 90);
        t.zona = None;
        t.pos_x = None;
        t.pos_y = None;

        let view = TableView::build(&t, None);
        assert!(view.position.is_none());
        assert!(view.zona.is_none());
        assert_eq!(view.rotacion, 90);
        assert_eq!(view.chip, LARGE_CHIP);
    }

    #[test]
    fn test_view_zeroes_rotation_for_small_tables() {
        let view = TableView::build(&table(4, 180), None);
        assert_eq!(view.rotacion, 0);
        assert_eq!(view.container, SMALL_CHIP);
    }
}
