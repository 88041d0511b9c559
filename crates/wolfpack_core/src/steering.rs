//! Steering primitives and the behavior trait.
//!
//! A behavior turns a [`BehaviorContext`] into a force. The host sums the
//! forces of the active behaviors with its own weights and integrates the
//! result; this crate never moves anything.

use crate::collaborators::{PopulationHealth, PreySelector, ResourceStore, SignalSink};
use crate::context::BehaviorContext;
use crate::systems::hunting::order::PackOrderBook;
use wolfpack_data::Vec3;

/// Host services a behavior may consult during one call.
pub struct Services<'a> {
    pub resources: &'a mut dyn ResourceStore,
    pub prey: &'a dyn PreySelector,
    pub population: &'a dyn PopulationHealth,
    pub signals: &'a mut dyn SignalSink,
    pub orders: &'a mut PackOrderBook,
    /// Collaborator failures absorbed during this call.
    pub failures: u64,
}

pub trait SteeringBehavior {
    /// Force for this tick. [`Vec3::ZERO`] means "no opinion".
    fn calculate(&mut self, ctx: &BehaviorContext<'_>, services: &mut Services<'_>) -> Vec3;
}

/// Classic seek: desired velocity towards `target` at `speed`, minus the
/// current velocity, clamped to `max_force`.
#[must_use]
pub fn seek(position: Vec3, velocity: Vec3, target: Vec3, speed: f64, max_force: f64) -> Vec3 {
    let desired = (target - position).normalize() * speed;
    if desired.is_zero() {
        return Vec3::ZERO;
    }
    (desired - velocity).limit(max_force)
}

/// Opposite of [`seek`].
#[must_use]
pub fn flee(position: Vec3, velocity: Vec3, threat: Vec3, speed: f64, max_force: f64) -> Vec3 {
    let desired = (position - threat).normalize() * speed;
    if desired.is_zero() {
        return Vec3::ZERO;
    }
    (desired - velocity).limit(max_force)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_points_at_target() {
        let f = seek(Vec3::ZERO, Vec3::ZERO, Vec3::flat(10.0, 0.0), 1.0, 0.5);
        assert!((f.magnitude() - 0.5).abs() < 1e-12);
        assert!(f.x > 0.0);
        assert_eq!(f.z, 0.0);
    }

    #[test]
    fn test_seek_subtracts_velocity() {
        // Already moving at the desired velocity: no correction.
        let f = seek(Vec3::ZERO, Vec3::flat(1.0, 0.0), Vec3::flat(10.0, 0.0), 1.0, 0.5);
        assert!(f.is_zero());
    }

    #[test]
    fn test_seek_on_target_is_zero() {
        let p = Vec3::flat(3.0, 3.0);
        assert_eq!(seek(p, Vec3::flat(0.2, 0.0), p, 1.0, 0.5), Vec3::ZERO);
    }

    #[test]
    fn test_flee_points_away() {
        let f = flee(Vec3::ZERO, Vec3::ZERO, Vec3::flat(1.0, 0.0), 1.0, 0.5);
        assert!(f.x < 0.0);
    }
}
