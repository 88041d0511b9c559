use super::rank::HierarchyTracker;
use crate::collaborators::{Signal, SignalKind, SignalSink};
use crate::config::HierarchyConfig;
use crate::context::{BehaviorContext, PackStanding};
use crate::steering::{flee, seek, Services, SteeringBehavior};
use wolfpack_data::{EntitySnapshot, Vec3};

/// Keeps a pack together around its Alpha.
///
/// The Alpha drifts towards the centroid of its visible packmates once the
/// pack spreads past `cohesion_distance`; everyone else trails the Alpha at
/// `follow_distance`, backing off when crowding it and closing in when left
/// behind.
pub struct HierarchyBehavior {
    config: HierarchyConfig,
    tracker: HierarchyTracker,
    last_howl: Option<u64>,
}

impl HierarchyBehavior {
    pub fn new(config: HierarchyConfig) -> Self {
        Self {
            tracker: HierarchyTracker::new(config.clone()),
            config,
            last_howl: None,
        }
    }

    pub fn tracker(&self) -> &HierarchyTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut HierarchyTracker {
        &mut self.tracker
    }

    /// See [`HierarchyTracker::refresh`].
    pub fn refresh(
        &mut self,
        tick: u64,
        agent: &EntitySnapshot,
        neighbors: &[EntitySnapshot],
    ) -> PackStanding {
        self.tracker.refresh(tick, agent, neighbors)
    }

    fn maybe_bonding_howl(&mut self, ctx: &BehaviorContext<'_>, signals: &mut dyn SignalSink) {
        if !self.config.bonding_howl {
            return;
        }
        let due = self
            .last_howl
            .map_or(true, |t| ctx.tick.saturating_sub(t) >= self.config.bonding_howl_interval);
        if due {
            signals.emit(Signal {
                kind: SignalKind::BondingHowl,
                source: ctx.agent.id,
                pack_id: ctx.standing.pack_id,
                position: ctx.position(),
                tick: ctx.tick,
            });
            self.last_howl = Some(ctx.tick);
        }
    }
}

impl SteeringBehavior for HierarchyBehavior {
    fn calculate(&mut self, ctx: &BehaviorContext<'_>, services: &mut Services<'_>) -> Vec3 {
        let mates: Vec<&EntitySnapshot> = ctx.packmates().collect();
        if mates.is_empty() {
            return Vec3::ZERO;
        }
        let pull = ctx.max_force * self.config.follow_strength;

        if ctx.standing.is_alpha() {
            self.maybe_bonding_howl(ctx, services.signals);
            let centroid =
                mates.iter().map(|m| m.position).sum::<Vec3>() * (1.0 / mates.len() as f64);
            if ctx.position().distance_to(centroid) > self.config.cohesion_distance {
                return seek(ctx.position(), ctx.velocity(), centroid, ctx.max_speed, pull);
            }
            return Vec3::ZERO;
        }

        let Some(alpha) = ctx.visible_alpha() else {
            return Vec3::ZERO;
        };
        let distance = ctx.position().distance_to(alpha.position);
        if distance < self.config.follow_distance * 0.8 {
            flee(
                ctx.position(),
                ctx.velocity(),
                alpha.position,
                ctx.max_speed,
                pull * 0.5,
            )
        } else if distance > self.config.cohesion_distance {
            seek(
                ctx.position(),
                ctx.velocity(),
                alpha.position,
                ctx.max_speed,
                pull,
            )
        } else {
            Vec3::ZERO
        }
    }
}
