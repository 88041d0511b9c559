//! Settlement siege coordination.
//!
//! Rank decides the role: the Alpha commands from a standoff, the Beta
//! scouts and strikes isolated targets, everyone else guards the perimeter.
//! Which pack sieges, and when, is decided by [`scheduler::SiegeScheduler`].

pub mod scheduler;

pub use scheduler::{ActiveSiege, PackSurvey, RetreatReason, SiegeDecision, SiegeScheduler};

use crate::config::SiegeConfig;
use crate::context::BehaviorContext;
use crate::steering::{seek, Services, SteeringBehavior};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use wolfpack_data::{AgentId, EntitySnapshot, Rank, SiegeRole, SiegeType, Species, TargetClass, Vec3};

pub fn role(rank: Rank) -> SiegeRole {
    match rank {
        Rank::Alpha => SiegeRole::Commander,
        Rank::Beta => SiegeRole::Scout,
        Rank::Mid | Rank::Omega | Rank::Unknown => SiegeRole::Guard,
    }
}

/// A settlement under siege.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub center: Vec3,
    pub radius: f64,
}

pub fn priority(class: TargetClass, config: &SiegeConfig) -> f64 {
    match class {
        TargetClass::Livestock => config.livestock_priority,
        TargetClass::ChildVillager => config.child_priority,
        TargetClass::AdultVillager => config.adult_priority,
        TargetClass::Guardian => config.guardian_priority,
    }
}

pub fn admits(siege_type: SiegeType, class: TargetClass) -> bool {
    match siege_type {
        SiegeType::LivestockRaid => class == TargetClass::Livestock,
        SiegeType::FullAssault => true,
    }
}

#[inline]
pub fn distance_score(distance: f64) -> f64 {
    1.0 / (1.0 + 0.1 * distance)
}

/// No living guardian within `radius` of `candidate`.
pub fn is_isolated(candidate: &EntitySnapshot, others: &[EntitySnapshot], radius: f64) -> bool {
    !others.iter().any(|o| {
        o.id != candidate.id
            && o.alive
            && o.species == Species::IronGolem
            && o.position.distance_to(candidate.position) <= radius
    })
}

/// `priority * distance score * role modifier`, or `None` when the siege
/// type does not admit the candidate.
pub fn target_score(
    agent: &EntitySnapshot,
    candidate: &EntitySnapshot,
    role: SiegeRole,
    siege_type: SiegeType,
    others: &[EntitySnapshot],
    config: &SiegeConfig,
) -> Option<f64> {
    if !candidate.alive || candidate.tamed || candidate.id == agent.id {
        return None;
    }
    let class = candidate.species.target_class(candidate.juvenile)?;
    if !admits(siege_type, class) {
        return None;
    }
    let modifier = if role == SiegeRole::Scout && is_isolated(candidate, others, config.isolation_radius) {
        config.scout_isolation_modifier
    } else {
        1.0
    };
    Some(priority(class, config) * distance_score(agent.distance_to(candidate)) * modifier)
}

/// Highest scoring candidate; equal scores go to the lower id.
pub fn select_target<'a>(
    agent: &EntitySnapshot,
    role: SiegeRole,
    siege_type: SiegeType,
    candidates: &'a [EntitySnapshot],
    config: &SiegeConfig,
) -> Option<&'a EntitySnapshot> {
    candidates
        .iter()
        .filter_map(|c| {
            target_score(agent, c, role, siege_type, candidates, config).map(|score| (score, c))
        })
        .max_by(|a, b| match a.0.total_cmp(&b.0) {
            Ordering::Equal => b.1.id.cmp(&a.1.id),
            other => other,
        })
        .map(|(_, c)| c)
}

/// Perimeter point between the settlement center and the agent.
pub fn guard_post(settlement: &Settlement, agent: Vec3) -> Vec3 {
    let heading = (agent - settlement.center).normalize();
    settlement.center + heading * settlement.radius
}

#[derive(Debug, Clone)]
pub struct WolfSiegeBehavior {
    config: SiegeConfig,
    settlement: Option<Settlement>,
    siege_type: SiegeType,
    target: Option<AgentId>,
}

impl WolfSiegeBehavior {
    pub fn new(config: SiegeConfig) -> Self {
        Self {
            config,
            settlement: None,
            siege_type: SiegeType::default(),
            target: None,
        }
    }

    pub fn engage(&mut self, settlement: Settlement, siege_type: SiegeType) {
        self.settlement = Some(settlement);
        self.siege_type = siege_type;
        self.target = None;
    }

    pub fn disengage(&mut self) {
        self.settlement = None;
        self.target = None;
    }

    pub fn is_engaged(&self) -> bool {
        self.settlement.is_some()
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    pub fn siege_type(&self) -> SiegeType {
        self.siege_type
    }

    pub fn target(&self) -> Option<AgentId> {
        self.target
    }

    fn commander_force(&self, ctx: &BehaviorContext<'_>, target: &EntitySnapshot) -> Vec3 {
        let distance = ctx.agent.distance_to(target);
        if distance < self.config.commander_min_standoff {
            (ctx.position() - target.position).normalize()
                * (ctx.max_force * self.config.commander_retreat_factor)
        } else if distance > self.config.commander_max_standoff {
            seek(ctx.position(), ctx.velocity(), target.position, ctx.max_speed, ctx.max_force)
        } else {
            Vec3::ZERO
        }
    }

    fn scout_force(&self, ctx: &BehaviorContext<'_>, target: &EntitySnapshot) -> Vec3 {
        let speed = if ctx.climate.is_blizzard() {
            ctx.max_speed * (1.0 + self.config.weather_boost)
        } else {
            ctx.max_speed
        };
        seek(ctx.position(), ctx.velocity(), target.position, speed, ctx.max_force)
    }

    fn guard_force(&self, ctx: &BehaviorContext<'_>, settlement: &Settlement, target: &EntitySnapshot) -> Vec3 {
        let outward = target.position - settlement.center;
        let near_perimeter = outward.magnitude() >= settlement.radius * self.config.perimeter_band;
        let leaving = target.velocity.dot(outward) > 0.0;
        let close = ctx.agent.distance_to(target) <= self.config.guard_radius;
        if (near_perimeter && leaving) || close {
            return seek(ctx.position(), ctx.velocity(), target.position, ctx.max_speed, ctx.max_force);
        }

        let post = guard_post(settlement, ctx.position());
        if ctx.position().distance_to(post) > self.config.post_tolerance {
            seek(ctx.position(), ctx.velocity(), post, ctx.max_speed, ctx.max_force)
        } else {
            Vec3::ZERO
        }
    }
}

impl SteeringBehavior for WolfSiegeBehavior {
    fn calculate(&mut self, ctx: &BehaviorContext<'_>, _services: &mut Services<'_>) -> Vec3 {
        let Some(settlement) = self.settlement else {
            return Vec3::ZERO;
        };
        let role = role(ctx.standing.rank);
        let target = select_target(&ctx.agent, role, self.siege_type, ctx.neighbors, &self.config);
        self.target = target.map(|t| t.id);

        let Some(target) = target else {
            return seek(
                ctx.position(),
                ctx.velocity(),
                settlement.center,
                ctx.max_speed,
                ctx.max_force * self.config.center_seek_factor,
            );
        };

        match role {
            SiegeRole::Commander => self.commander_force(ctx, target),
            SiegeRole::Scout => self.scout_force(ctx, target),
            SiegeRole::Guard => self.guard_force(ctx, &settlement, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{PopulationHealth, PreySelector, ResourceStore, Signal};
    use crate::context::PackStanding;
    use crate::error::Result;
    use crate::systems::hunting::order::PackOrderBook;
    use uuid::Uuid;
    use wolfpack_data::{Climate, PackId, Season, Weather};

    struct Inert;

    impl ResourceStore for Inert {
        fn read(&self, _: AgentId, _: &str) -> Result<Option<f64>> {
            Ok(None)
        }
        fn write(&mut self, _: AgentId, _: &str, _: f64) -> Result<()> {
            Ok(())
        }
    }

    impl PreySelector for Inert {
        fn select(&self, _: &BehaviorContext<'_>) -> Result<Option<EntitySnapshot>> {
            Ok(None)
        }
    }

    impl PopulationHealth for Inert {
        fn is_healthy(&self, _: &EntitySnapshot, _: &EntitySnapshot) -> Result<bool> {
            Ok(true)
        }
    }

    fn run(siege: &mut WolfSiegeBehavior, ctx: &BehaviorContext<'_>) -> Vec3 {
        let mut resources = Inert;
        let mut orders = PackOrderBook::default();
        let mut signals: Vec<Signal> = Vec::new();
        let mut services = Services {
            resources: &mut resources,
            prey: &Inert,
            population: &Inert,
            signals: &mut signals,
            orders: &mut orders,
            failures: 0,
        };
        siege.calculate(ctx, &mut services)
    }

    fn at(species: Species, x: f64, z: f64) -> EntitySnapshot {
        EntitySnapshot::new(Uuid::new_v4(), species, Vec3::flat(x, z))
    }

    fn ranked(rank: Rank) -> PackStanding {
        PackStanding {
            pack_id: Some(PackId(Uuid::new_v4())),
            rank,
            alpha_id: None,
        }
    }

    fn village() -> Settlement {
        Settlement {
            center: Vec3::ZERO,
            radius: 32.0,
        }
    }

    #[test]
    fn test_role_mapping() {
        assert_eq!(role(Rank::Alpha), SiegeRole::Commander);
        assert_eq!(role(Rank::Beta), SiegeRole::Scout);
        assert_eq!(role(Rank::Mid), SiegeRole::Guard);
        assert_eq!(role(Rank::Omega), SiegeRole::Guard);
        assert_eq!(role(Rank::Unknown), SiegeRole::Guard);
    }

    #[test]
    fn test_score_formula() {
        let config = SiegeConfig::default();
        let wolf = at(Species::Wolf, 0.0, 0.0);
        let cow = at(Species::Cow, 10.0, 0.0);
        let score = target_score(&wolf, &cow, SiegeRole::Guard, SiegeType::FullAssault, &[], &config).unwrap();
        assert!((score - 0.5).abs() < 1e-12);

        let scout = target_score(&wolf, &cow, SiegeRole::Scout, SiegeType::FullAssault, &[], &config).unwrap();
        assert!((scout - 0.6).abs() < 1e-12);

        let golem = at(Species::IronGolem, 12.0, 0.0);
        let guarded = target_score(&wolf, &cow, SiegeRole::Scout, SiegeType::FullAssault, &[golem], &config).unwrap();
        assert!((guarded - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_livestock_raid_ignores_villagers() {
        let config = SiegeConfig::default();
        let wolf = at(Species::Wolf, 0.0, 0.0);
        let villager = at(Species::Villager, 2.0, 0.0);
        let pig = at(Species::Pig, 30.0, 0.0);
        let candidates = [villager, pig];
        let picked = select_target(&wolf, SiegeRole::Guard, SiegeType::LivestockRaid, &candidates, &config);
        assert_eq!(picked.map(|c| c.id), Some(pig.id));

        let picked = select_target(&wolf, SiegeRole::Guard, SiegeType::FullAssault, &candidates, &config);
        assert_eq!(picked.map(|c| c.id), Some(villager.id));
    }

    #[test]
    fn test_scout_prefers_isolated_target() {
        let config = SiegeConfig::default();
        let wolf = at(Species::Wolf, 0.0, 0.0);
        let guarded = at(Species::Cow, 10.0, 0.0);
        let golem = at(Species::IronGolem, 10.0, 5.0);
        let lonely = at(Species::Cow, -11.0, 0.0);
        let candidates = [guarded, golem, lonely];
        let picked = select_target(&wolf, SiegeRole::Scout, SiegeType::LivestockRaid, &candidates, &config);
        assert_eq!(picked.map(|c| c.id), Some(lonely.id));
        let picked = select_target(&wolf, SiegeRole::Guard, SiegeType::LivestockRaid, &candidates, &config);
        assert_eq!(picked.map(|c| c.id), Some(guarded.id));
    }

    #[test]
    fn test_no_target_seeks_center() {
        let wolf = at(Species::Wolf, 50.0, 0.0);
        for rank in [Rank::Alpha, Rank::Beta, Rank::Mid, Rank::Omega, Rank::Unknown] {
            let mut siege = WolfSiegeBehavior::new(SiegeConfig::default());
            siege.engage(village(), SiegeType::FullAssault);
            let ctx = BehaviorContext::new(1, wolf, &[]).with_standing(ranked(rank));
            let force = run(&mut siege, &ctx);
            assert!(force.x < 0.0, "{rank:?} heads for the center");
            assert!(force.magnitude() <= ctx.max_force * 0.5 + 1e-9);
        }
    }

    #[test]
    fn test_disengaged_is_silent() {
        let mut siege = WolfSiegeBehavior::new(SiegeConfig::default());
        let ctx = BehaviorContext::new(1, at(Species::Wolf, 0.0, 0.0), &[]);
        assert_eq!(run(&mut siege, &ctx), Vec3::ZERO);
    }

    #[test]
    fn test_commander_keeps_standoff() {
        let mut siege = WolfSiegeBehavior::new(SiegeConfig::default());
        siege.engage(village(), SiegeType::LivestockRaid);
        let cow = at(Species::Cow, 0.0, 0.0);
        let neighbors = [cow];

        let close = BehaviorContext::new(1, at(Species::Wolf, 10.0, 0.0), &neighbors).with_standing(ranked(Rank::Alpha));
        let f = run(&mut siege, &close);
        assert!(f.x > 0.0, "backs off");
        assert!((f.magnitude() - close.max_force * 0.1).abs() < 1e-9);

        let band = BehaviorContext::new(1, at(Species::Wolf, 20.0, 0.0), &neighbors).with_standing(ranked(Rank::Alpha));
        assert_eq!(run(&mut siege, &band), Vec3::ZERO);

        let far = BehaviorContext::new(1, at(Species::Wolf, 40.0, 0.0), &neighbors).with_standing(ranked(Rank::Alpha));
        assert!(run(&mut siege, &far).x < 0.0, "approaches");
    }

    #[test]
    fn test_scout_boosted_in_blizzard() {
        let cow = at(Species::Cow, 0.0, 0.0);
        let neighbors = [cow];
        let mut wolf = at(Species::Wolf, 20.0, 0.0);
        wolf.velocity = Vec3::flat(-1.0, 0.0);
        let blizzard = Climate {
            season: Season::Winter,
            weather: Weather::Blizzard,
            day_time: 0,
        };
        let mut siege = WolfSiegeBehavior::new(SiegeConfig::default());
        siege.engage(village(), SiegeType::LivestockRaid);

        let calm = BehaviorContext::new(1, wolf, &neighbors).with_standing(ranked(Rank::Beta));
        assert!(run(&mut siege, &calm).is_zero(), "already at max speed");

        let storm = calm.with_climate(blizzard);
        let f = run(&mut siege, &storm);
        assert!(f.x < 0.0, "speeds up towards the target");
    }

    #[test]
    fn test_guard_holds_post_and_intercepts_escapes() {
        let settlement = village();
        let mut siege = WolfSiegeBehavior::new(SiegeConfig::default());
        siege.engage(settlement, SiegeType::LivestockRaid);
        let guard = at(Species::Wolf, 32.0, 0.0);

        // Calf wandering inside the village: hold the post.
        let mut inside = at(Species::Cow, 0.0, 10.0);
        inside.velocity = Vec3::flat(0.0, -0.1);
        let neighbors = [inside];
        let ctx = BehaviorContext::new(1, guard, &neighbors).with_standing(ranked(Rank::Omega));
        assert_eq!(run(&mut siege, &ctx), Vec3::ZERO);

        // Cow breaking out past the perimeter band: intercept.
        let mut escaping = at(Species::Cow, 0.0, 28.0);
        escaping.velocity = Vec3::flat(0.0, 0.3);
        let neighbors = [escaping];
        let ctx = BehaviorContext::new(1, guard, &neighbors).with_standing(ranked(Rank::Omega));
        let f = run(&mut siege, &ctx);
        assert!(f.z > 0.0 && f.x < 0.0);

        // Off post: walk back to it.
        let drifted = at(Species::Wolf, 10.0, 0.0);
        let neighbors = [inside];
        let ctx = BehaviorContext::new(1, drifted, &neighbors).with_standing(ranked(Rank::Mid));
        assert!(run(&mut siege, &ctx).x > 0.0);
    }
}
