//! Territory defense and patrol.
//!
//! The territory is centered where the agent first ran this behavior. Foreign
//! wolves inside it are confronted with an urgency that grows towards the
//! den; otherwise the agent patrols a ring between the core and the border.

use crate::collaborators::{Signal, SignalKind, SignalSink};
use crate::config::TerritoryConfig;
use crate::context::BehaviorContext;
use crate::steering::{seek, Services, SteeringBehavior};
use wolfpack_data::{EntitySnapshot, Vec3};

/// Defense urgency from the defender's distance to the center.
pub fn urgency(distance_from_center: f64, outer_radius: f64) -> f64 {
    (1.0 - distance_from_center / outer_radius).clamp(0.3, 1.0)
}

pub struct PackTerritoryBehavior {
    config: TerritoryConfig,
    center: Option<Vec3>,
    last_howl: Option<u64>,
    last_mark: Option<u64>,
}

impl PackTerritoryBehavior {
    pub fn new(config: TerritoryConfig) -> Self {
        Self {
            config,
            center: None,
            last_howl: None,
            last_mark: None,
        }
    }

    pub fn center(&self) -> Option<Vec3> {
        self.center
    }

    /// Moves the territory. Not used by the default host.
    pub fn recenter(&mut self, center: Vec3) {
        self.center = Some(center);
    }

    /// Foreign wolf close enough to matter. Detection reaches the whole
    /// outer radius for intruders inside the core, only the core radius for
    /// intruders nearer the border.
    pub fn detect_intruder<'a>(&self, ctx: &BehaviorContext<'a>, center: Vec3) -> Option<&'a EntitySnapshot> {
        let me = &ctx.agent;
        ctx.neighbors
            .iter()
            .filter(|n| n.species == me.species && n.alive && !n.tamed && n.id != me.id)
            .filter(|n| me.pack_id.is_none() || n.pack_id != me.pack_id)
            .filter(|n| {
                let from_center = n.position.distance_to(center);
                if from_center >= self.config.outer_radius {
                    return false;
                }
                let detection = if from_center < self.config.core_radius {
                    self.config.outer_radius
                } else {
                    self.config.core_radius
                };
                me.distance_to(n) < detection
            })
            .min_by(|a, b| me.distance_to(a).total_cmp(&me.distance_to(b)))
    }

    fn emit_if_due(
        last: &mut Option<u64>,
        interval: u64,
        kind: SignalKind,
        ctx: &BehaviorContext<'_>,
        signals: &mut dyn SignalSink,
    ) {
        let due = last.map_or(true, |t| ctx.tick.saturating_sub(t) >= interval);
        if due {
            signals.emit(Signal {
                kind,
                source: ctx.agent.id,
                pack_id: ctx.standing.pack_id,
                position: ctx.position(),
                tick: ctx.tick,
            });
            *last = Some(ctx.tick);
        }
    }

    fn defend(&mut self, ctx: &BehaviorContext<'_>, center: Vec3, intruder: &EntitySnapshot, signals: &mut dyn SignalSink) -> Vec3 {
        let from_center = ctx.position().distance_to(center);
        if from_center < self.config.core_radius {
            Self::emit_if_due(
                &mut self.last_howl,
                self.config.howl_cooldown,
                SignalKind::AlertHowl,
                ctx,
                signals,
            );
        }
        let urgency = urgency(from_center, self.config.outer_radius);
        (intruder.position - ctx.position()).normalize() * (ctx.max_force * urgency)
    }

    fn patrol(&mut self, ctx: &BehaviorContext<'_>, center: Vec3, signals: &mut dyn SignalSink) -> Vec3 {
        let here = ctx.position();
        let from_center = here.distance_to(center);

        if from_center > self.config.outer_radius * self.config.boundary_fraction {
            Self::emit_if_due(
                &mut self.last_mark,
                self.config.scent_interval,
                SignalKind::ScentMark,
                ctx,
                signals,
            );
            return seek(
                here,
                ctx.velocity(),
                center,
                self.config.patrol_speed,
                self.config.defense_force * 0.5,
            );
        }

        if from_center < self.config.core_radius * self.config.inner_fraction {
            let outward = (here - center).normalize();
            // Standing on the center: any heading works, pick +x.
            let outward = if outward.is_zero() { Vec3::flat(1.0, 0.0) } else { outward };
            let boundary = center + outward * self.config.outer_radius;
            return seek(
                here,
                ctx.velocity(),
                boundary,
                self.config.patrol_speed,
                self.config.defense_force * 0.3,
            );
        }

        Vec3::ZERO
    }
}

impl SteeringBehavior for PackTerritoryBehavior {
    fn calculate(&mut self, ctx: &BehaviorContext<'_>, services: &mut Services<'_>) -> Vec3 {
        if ctx.agent.tamed {
            return Vec3::ZERO;
        }
        let center = *self.center.get_or_insert(ctx.position());

        if let Some(intruder) = self.detect_intruder(ctx, center) {
            return self.defend(ctx, center, intruder, services.signals);
        }
        self.patrol(ctx, center, services.signals)
    }
}
