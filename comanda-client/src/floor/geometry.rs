//! Drop geometry
//!
//! Pure pointer-to-canvas math for the floor editor. No I/O, no state.

use serde::{Deserialize, Serialize};

/// Pointer location in absolute screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Measured canvas rectangle in absolute screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: the right and bottom edges belong to the
    /// neighbor.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// Chip footprint in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipSize {
    pub width: i32,
    pub height: i32,
}

/// Placed position inside a zone canvas, in wire pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// A zone together with its measured canvas rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneFrame {
    pub name: String,
    pub rect: Rect,
}

impl ZoneFrame {
    pub fn new(name: impl Into<String>, rect: Rect) -> Self {
        Self {
            name: name.into(),
            rect,
        }
    }
}

/// Left margin inside a zone
const MIN_X: f64 = 10.0;
/// Top margin inside a zone; reserves the zone header strip
const MIN_Y: f64 = 50.0;

/// Compute where a dragged chip lands inside a zone.
///
/// The chip is centered on the pointer, translated into the zone's local
/// coordinates and clamped so it stays inside the zone with a 10px left
/// margin and a 50px top margin. Zones smaller than a chip pin it to the
/// margins.
pub fn compute_drop_position(pointer: Point, zone: Rect, chip: ChipSize) -> Position {
    let raw_x = pointer.x - zone.x - f64::from(chip.width) / 2.0;
    let raw_y = pointer.y - zone.y - f64::from(chip.height) / 2.0;
    let max_x = (zone.width - f64::from(chip.width)).max(MIN_X);
    let max_y = (zone.height - f64::from(chip.height)).max(MIN_Y);
    Position {
        x: raw_x.clamp(MIN_X, max_x).round() as i32,
        y: raw_y.clamp(MIN_Y, max_y).round() as i32,
    }
}

/// Find the zone under a drop point. `None` means the drop missed every
/// zone and the drag reverts.
pub fn find_zone(point: Point, zones: &[ZoneFrame]) -> Option<&ZoneFrame> {
    zones.iter().find(|zone| zone.rect.contains(point))
}

/// Name of the zone under a drop point
pub fn hit_test_zone(point: Point, zones: &[ZoneFrame]) -> Option<&str> {
    find_zone(point, zones).map(|zone| zone.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHIP: ChipSize = ChipSize {
        width: 100,
        height: 48,
    };

    #[test]
    fn test_drop_clamps_to_margins() {
        // Raw landing at (5, 10) is pushed to the (10, 50) margins.
        let zone = Rect::new(0.0, 0.0, 600.0, 500.0);
        let pointer = Point::new(55.0, 34.0);
        assert_eq!(
            compute_drop_position(pointer, zone, CHIP),
            Position { x: 10, y: 50 }
        );
    }

    #[test]
    fn test_drop_clamps_to_far_edges() {
        // Way out of bounds clamps to width - chip and height - chip.
        let zone = Rect::new(0.0, 0.0, 600.0, 500.0);
        let pointer = Point::new(9050.0, 9024.0);
        assert_eq!(
            compute_drop_position(pointer, zone, CHIP),
            Position { x: 500, y: 452 }
        );
    }

    #[test]
    fn test_drop_accounts_for_zone_offset() {
        let zone = Rect::new(300.0, 200.0, 600.0, 500.0);
        // Pointer at zone-local (150 + chip/2, 100 + chip/2).
        let pointer = Point::new(300.0 + 200.0, 200.0 + 124.0);
        assert_eq!(
            compute_drop_position(pointer, zone, CHIP),
            Position { x: 150, y: 100 }
        );
    }

    #[test]
    fn test_drop_in_zone_smaller_than_chip() {
        let zone = Rect::new(0.0, 0.0, 80.0, 40.0);
        let pointer = Point::new(40.0, 20.0);
        assert_eq!(
            compute_drop_position(pointer, zone, CHIP),
            Position { x: 10, y: 50 }
        );
    }

    #[test]
    fn test_hit_test_finds_containing_zone() {
        let zones = vec![
            ZoneFrame::new("Interior", Rect::new(0.0, 0.0, 600.0, 500.0)),
            ZoneFrame::new("Terraza", Rect::new(600.0, 0.0, 400.0, 500.0)),
        ];

        assert_eq!(
            hit_test_zone(Point::new(700.0, 100.0), &zones),
            Some("Terraza")
        );
        assert_eq!(
            hit_test_zone(Point::new(10.0, 10.0), &zones),
            Some("Interior")
        );
        assert_eq!(hit_test_zone(Point::new(1200.0, 100.0), &zones), None);
    }

    #[test]
    fn test_hit_test_edges_are_half_open() {
        let zones = vec![
            ZoneFrame::new("Interior", Rect::new(0.0, 0.0, 600.0, 500.0)),
            ZoneFrame::new("Terraza", Rect::new(600.0, 0.0, 400.0, 500.0)),
        ];

        // The shared edge belongs to the right-hand zone.
        assert_eq!(
            hit_test_zone(Point::new(600.0, 100.0), &zones),
            Some("Terraza")
        );
    }
}
