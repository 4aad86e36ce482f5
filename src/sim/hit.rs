//! Click hit-testing against falling targets
//!
//! Targets are plain discs, so a hit is a point-in-circle test. A linear scan
//! is plenty at a few dozen targets.

use glam::Vec2;

use super::state::Target;

/// Check if a point lies strictly inside a disc
#[inline]
pub fn point_in_disc(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance(center) < radius
}

/// Index of the target a click at `point` lands on
///
/// Scans newest first (reverse spawn order) so the most recently spawned
/// target wins when discs overlap.
pub fn pick_target(targets: &[Target], point: Vec2) -> Option<usize> {
    targets
        .iter()
        .rposition(|t| point_in_disc(point, t.pos, t.radius))
}
