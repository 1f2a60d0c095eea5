//! Navigation registry
//!
//! One static table of destinations, filtered per session by the granted
//! permission strings. Entries without a requirement are visible to every
//! signed-in role; adding a destination is adding a row here.

/// Master permission that implies every other one
pub const PERM_ALL: &str = "all";

/// How a destination renders in the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSpec {
    pub label: &'static str,
    pub icon: &'static str,
    pub route: &'static str,
}

/// One navigation destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    /// Stable key, independent of label or route
    pub key: &'static str,
    /// Permission required to see this entry; `None` means everyone
    pub requires: Option<&'static str>,
    pub render: RenderSpec,
}

/// Every destination the shell knows, in display order
pub const NAV_ITEMS: &[NavEntry] = &[
    NavEntry {
        key: "floor",
        requires: None,
        render: RenderSpec {
            label: "Salón",
            icon: "layout-grid",
            route: "/salon",
        },
    },
    NavEntry {
        key: "orders",
        requires: None,
        render: RenderSpec {
            label: "Pedidos",
            icon: "receipt",
            route: "/pedidos",
        },
    },
    NavEntry {
        key: "kitchen",
        requires: None,
        render: RenderSpec {
            label: "Cocina",
            icon: "chef-hat",
            route: "/cocina",
        },
    },
    NavEntry {
        key: "reservations",
        requires: None,
        render: RenderSpec {
            label: "Reservas",
            icon: "calendar",
            route: "/reservas",
        },
    },
    NavEntry {
        key: "floor-editor",
        requires: Some("tables:manage"),
        render: RenderSpec {
            label: "Editar salón",
            icon: "move",
            route: "/salon/editar",
        },
    },
    NavEntry {
        key: "reports",
        requires: Some("reports:view"),
        render: RenderSpec {
            label: "Informes",
            icon: "bar-chart",
            route: "/informes",
        },
    },
    NavEntry {
        key: "settings",
        requires: Some("settings:manage"),
        render: RenderSpec {
            label: "Ajustes",
            icon: "settings",
            route: "/ajustes",
        },
    },
];

/// Whether a granted set satisfies a requirement
pub fn has_permission(granted: &[String], required: Option<&str>) -> bool {
    match required {
        None => true,
        Some(required) => granted.iter().any(|g| g == PERM_ALL || g == required),
    }
}

/// The destinations a session may see, in display order
pub fn visible_items(granted: &[String]) -> Vec<&'static NavEntry> {
    NAV_ITEMS
        .iter()
        .filter(|entry| has_permission(granted, entry.requires))
        .collect()
}
