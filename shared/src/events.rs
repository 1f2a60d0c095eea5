//! Push topic names
//!
//! Named events emitted by the server over the one-directional push channel
//! (`GET /eventos`). Payloads are advisory; the sync client treats arrival
//! alone as a refresh trigger.

use std::fmt;

/// A named push topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// A table changed (placement, capacity, activation).
    MesaUpdated,
    /// An order changed; table status may have moved with it.
    PedidoUpdated,
    /// An upcoming reservation changed.
    ReservaUpdated,
}

impl Topic {
    /// Topics the floor view subscribes to.
    pub const ALL: [Topic; 3] = [Topic::MesaUpdated, Topic::PedidoUpdated, Topic::ReservaUpdated];

    /// Wire name of the event as sent in the `event:` field.
    pub const fn name(self) -> &'static str {
        match self {
            Topic::MesaUpdated => "mesa.updated",
            Topic::PedidoUpdated => "pedido.updated",
            Topic::ReservaUpdated => "reserva.updated",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<&str> for Topic {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "mesa.updated" => Ok(Topic::MesaUpdated),
            "pedido.updated" => Ok(Topic::PedidoUpdated),
            "reserva.updated" => Ok(Topic::ReservaUpdated),
            _ => Err(()),
        }
    }
}
