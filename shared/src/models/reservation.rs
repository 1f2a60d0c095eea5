//! Reservation Hint Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upcoming reservation entry (`GET /reservas/proximas`).
///
/// A display-only overlay joined onto tables by `mesa_id`; never part of the
/// table's own persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationHint {
    pub id: i64,
    pub mesa_id: i64,
    pub fecha_hora: DateTime<Utc>,
    pub cliente_nombre: String,
    /// Party size; older servers omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personas: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_wire_names() {
        let hint: ReservationHint = serde_json::from_str(
            r#"{
                "id": 1,
                "mesaId": 7,
                "fechaHora": "2025-06-14T20:30:00Z",
                "clienteNombre": "García"
            }"#,
        )
        .unwrap();

        assert_eq!(hint.mesa_id, 7);
        assert_eq!(hint.cliente_nombre, "García");
        assert_eq!(hint.personas, None);
    }
}
