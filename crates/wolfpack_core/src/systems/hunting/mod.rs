//! Coordinated pack hunting.
//!
//! Each agent runs its own [`PackHuntingBehavior`]. The leader (the Alpha, a
//! sole hunter, or whoever is closest when no Alpha is in sight) pursues the
//! prey directly; everyone else takes a flanking slot derived from their
//! place in the pack's cached distance order.
//!
//! ```text
//! Idle -> Searching -> Waiting | Leading | Flanking -> Attacking
//!            ^                        |                  |
//!            +------ Resting <--------+---- give up / kill
//! ```

pub mod order;
pub mod prey;
pub mod session;

pub use order::{fresh_index, PackOrder, PackOrderBook};
pub use prey::{is_valid_prey, passes_population_check, LocalDensityFloor};
pub use session::HuntingSession;

use crate::collaborators::{read_or, ResourceStore, ENERGY_KEY, HUNGER_KEY};
use crate::config::HuntingConfig;
use crate::context::BehaviorContext;
use crate::steering::{seek, Services, SteeringBehavior};
use wolfpack_data::{AgentId, EntitySnapshot, HuntingState, Vec3};

/// Signed angular offset for the flanker at `index` in the distance order.
///
/// Magnitude grows every second index and the sign alternates, so indices
/// 1, 2, 3, 4 land at -1, +2, -2, +3 times `flanking_angle`.
pub fn flank_offset(index: usize, flanking_angle: f64) -> f64 {
    let magnitude = flanking_angle * (1 + index / 2) as f64;
    if index % 2 == 0 {
        magnitude
    } else {
        -magnitude
    }
}

/// Seek point for a flanker: rotate the prey-to-agent bearing by the
/// index offset and stand off at `max(min_flank_distance, 0.7 * distance)`.
pub fn flank_point(agent: Vec3, prey: Vec3, index: usize, config: &HuntingConfig) -> Vec3 {
    let distance = agent.distance_to(prey);
    let bearing = (agent - prey).bearing() + flank_offset(index, config.flanking_angle);
    let reach = config
        .min_flank_distance
        .max(distance * config.flank_distance_factor);
    prey + Vec3::from_bearing(bearing) * reach
}

pub struct PackHuntingBehavior {
    config: HuntingConfig,
    session: HuntingSession,
}

impl PackHuntingBehavior {
    pub fn new(config: HuntingConfig) -> Self {
        Self {
            config,
            session: HuntingSession::default(),
        }
    }

    pub fn state(&self) -> HuntingState {
        self.session.state
    }

    pub fn session(&self) -> &HuntingSession {
        &self.session
    }

    pub fn config(&self) -> &HuntingConfig {
        &self.config
    }

    pub fn has_energy_for_hunt(&self, energy: f64) -> bool {
        energy >= self.config.hunt_energy_cost
    }

    pub fn is_satiated(&self, hunger: f64) -> bool {
        hunger >= self.config.satiation_threshold
    }

    /// Resource gate. Missing records fail open: full energy, empty stomach.
    pub fn can_hunt(&self, agent: AgentId, resources: &dyn ResourceStore, failures: &mut u64) -> bool {
        let energy = read_or(resources, agent, ENERGY_KEY, self.config.full_energy, failures);
        let hunger = read_or(resources, agent, HUNGER_KEY, 0.0, failures);
        self.has_energy_for_hunt(energy) && !self.is_satiated(hunger) && !self.session.is_handling()
    }

    /// Keeps the current prey while it stays valid and in range, otherwise
    /// asks the selector. Every answer passes the local filters and the
    /// population gate.
    pub fn find_prey(&self, ctx: &BehaviorContext<'_>, services: &mut Services<'_>) -> Option<EntitySnapshot> {
        let hunter = &ctx.agent;

        if let Some(current) = self.session.target.and_then(|id| ctx.find(id)) {
            let in_range = hunter.distance_to(current) <= self.config.coordination_range;
            if in_range
                && is_valid_prey(hunter, current, &self.config.prey_species)
                && passes_population_check(services.population, hunter, current, &mut services.failures)
            {
                return Some(*current);
            }
        }

        let candidate = match services.prey.select(ctx) {
            Ok(candidate) => candidate?,
            Err(err) => {
                services.failures += 1;
                tracing::warn!(agent = %hunter.id, error = %err, "Prey selection failed");
                return None;
            }
        };
        if !is_valid_prey(hunter, &candidate, &self.config.prey_species) {
            return None;
        }
        if !passes_population_check(services.population, hunter, &candidate, &mut services.failures) {
            return None;
        }
        Some(candidate)
    }

    /// Called by the host when this agent's strike killed its prey.
    pub fn on_successful_kill(&mut self, agent: AgentId, resources: &mut dyn ResourceStore) {
        let mut failures = 0;
        let energy = read_or(&*resources, agent, ENERGY_KEY, self.config.full_energy, &mut failures);
        let remaining = (energy - self.config.hunt_energy_cost).max(0.0);
        if let Err(err) = resources.write(agent, ENERGY_KEY, remaining) {
            tracing::warn!(agent = %agent, error = %err, "Could not deduct hunt energy");
        }
        self.session.killed_recently = true;
        self.session.handling_remaining = self.config.handling_ticks;
        self.session.transition(agent, HuntingState::Resting);
    }

    /// Pack members within coordination range of the prey, self included.
    ///
    /// Drawn from the host's pack roster when there is one, so every hunter
    /// of the same prey gets the same membership and the pack shares one
    /// cached order. Falls back to the visible packmates otherwise.
    pub fn hunting_party(&self, ctx: &BehaviorContext<'_>, prey: &EntitySnapshot) -> Vec<EntitySnapshot> {
        let reach = self.config.coordination_range;
        let near_prey = |m: &&EntitySnapshot| m.position.distance_to(prey.position) <= reach;
        let mut party: Vec<EntitySnapshot> = if ctx.pack.is_empty() {
            ctx.packmates().filter(near_prey).copied().collect()
        } else {
            ctx.pack
                .iter()
                .filter(|m| ctx.agent.is_packmate_of(m))
                .filter(near_prey)
                .copied()
                .collect()
        };
        party.push(ctx.agent);
        party
    }

    fn is_leader(&self, ctx: &BehaviorContext<'_>, index: usize, party_size: usize) -> bool {
        if party_size <= 1 || ctx.standing.is_alpha() {
            return true;
        }
        ctx.visible_alpha().is_none() && index == 0
    }
}

impl SteeringBehavior for PackHuntingBehavior {
    fn calculate(&mut self, ctx: &BehaviorContext<'_>, services: &mut Services<'_>) -> Vec3 {
        let me = ctx.agent.id;
        self.session.tick();

        if self.session.state == HuntingState::Resting {
            if self.session.rest_ticks >= self.config.rest_ticks {
                self.session.transition(me, HuntingState::Searching);
            }
            return Vec3::ZERO;
        }

        if !self.can_hunt(me, &*services.resources, &mut services.failures) {
            self.session.clear_target();
            self.session.transition(me, HuntingState::Idle);
            return Vec3::ZERO;
        }
        if self.session.state == HuntingState::Idle {
            self.session.transition(me, HuntingState::Searching);
        }

        let Some(prey) = self.find_prey(ctx, services) else {
            self.session.clear_target();
            if self.session.state.is_pursuing() {
                self.session.transition(me, HuntingState::Idle);
            }
            return Vec3::ZERO;
        };
        self.session.set_target(prey.id);

        if self.session.state.is_chasing() && self.session.hunt_ticks > self.config.give_up_ticks {
            tracing::debug!(agent = %me, prey = %prey.id, ticks = self.session.hunt_ticks, "Giving up hunt");
            self.session.transition(me, HuntingState::Resting);
            return Vec3::ZERO;
        }

        let party = self.hunting_party(ctx, &prey);
        let distance = ctx.position().distance_to(prey.position);

        if party.len() < self.config.min_pack_size && distance < self.config.assembly_distance {
            self.session.transition(me, HuntingState::Waiting);
            return Vec3::ZERO;
        }
        if distance < self.config.strike_distance {
            self.session.transition(me, HuntingState::Attacking);
            return Vec3::ZERO;
        }

        let index = match ctx.standing.pack_id {
            Some(pack) if party.len() > 1 => services
                .orders
                .index_for(pack, &party, &prey, me, ctx.tick, self.config.order_ttl_ticks)
                .unwrap_or(0),
            _ => 0,
        };

        if self.is_leader(ctx, index, party.len()) {
            self.session.transition(me, HuntingState::Leading);
            seek(
                ctx.position(),
                ctx.velocity(),
                prey.position,
                self.config.pursuit_speed,
                self.config.max_force,
            )
        } else {
            self.session.transition(me, HuntingState::Flanking);
            let point = flank_point(ctx.position(), prey.position, index, &self.config);
            seek(
                ctx.position(),
                ctx.velocity(),
                point,
                self.config.pursuit_speed * self.config.follower_speed_factor,
                self.config.max_force,
            )
        }
    }
}
