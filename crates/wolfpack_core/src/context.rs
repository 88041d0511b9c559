//! Per-tick input handed to every steering behavior.

use wolfpack_data::{AgentId, Climate, EntitySnapshot, PackId, Rank, Vec3};

/// Pack identity and rank as of the last hierarchy evaluation.
///
/// Computed once per evaluation window and passed by value into every
/// engine, so hunting, territory and siege all read the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PackStanding {
    pub pack_id: Option<PackId>,
    pub rank: Rank,
    pub alpha_id: Option<AgentId>,
}

impl PackStanding {
    #[must_use]
    pub fn is_alpha(&self) -> bool {
        self.rank == Rank::Alpha
    }
}

/// Read-consistent snapshot of one agent and its surroundings for one tick.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorContext<'a> {
    pub tick: u64,
    pub agent: EntitySnapshot,
    pub max_speed: f64,
    pub max_force: f64,
    /// Already spatially filtered; never contains `agent` itself.
    pub neighbors: &'a [EntitySnapshot],
    /// Every live member of the agent's pack this tick, self included. The
    /// host hands all members the same slice; empty when it does not track
    /// packs.
    pub pack: &'a [EntitySnapshot],
    pub standing: PackStanding,
    pub climate: Climate,
}

impl<'a> BehaviorContext<'a> {
    pub fn new(tick: u64, agent: EntitySnapshot, neighbors: &'a [EntitySnapshot]) -> Self {
        Self {
            tick,
            agent,
            max_speed: 1.0,
            max_force: 0.2,
            neighbors,
            pack: &[],
            standing: PackStanding {
                pack_id: agent.pack_id,
                ..Default::default()
            },
            climate: Climate::default(),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, max_speed: f64, max_force: f64) -> Self {
        self.max_speed = max_speed;
        self.max_force = max_force;
        self
    }

    #[must_use]
    pub fn with_standing(mut self, standing: PackStanding) -> Self {
        self.standing = standing;
        self
    }

    #[must_use]
    pub fn with_pack(mut self, pack: &'a [EntitySnapshot]) -> Self {
        self.pack = pack;
        self
    }

    #[must_use]
    pub fn with_climate(mut self, climate: Climate) -> Self {
        self.climate = climate;
        self
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.agent.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.agent.velocity
    }

    /// Visible members of the agent's pack, self excluded.
    pub fn packmates(&self) -> impl Iterator<Item = &'a EntitySnapshot> + '_ {
        let agent = self.agent;
        self.neighbors.iter().filter(move |n| agent.is_packmate_of(n))
    }

    pub fn find(&self, id: AgentId) -> Option<&'a EntitySnapshot> {
        self.neighbors.iter().find(|n| n.id == id)
    }

    /// The pack's Alpha if it is someone else and currently visible.
    pub fn visible_alpha(&self) -> Option<&'a EntitySnapshot> {
        let alpha = self.standing.alpha_id?;
        if alpha == self.agent.id {
            return None;
        }
        self.packmates().find(|m| m.id == alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use wolfpack_data::Species;

    #[test]
    fn test_packmates_filter() {
        let pack = PackId(Uuid::new_v4());
        let mut me = EntitySnapshot::new(Uuid::new_v4(), Species::Wolf, Vec3::ZERO);
        me.pack_id = Some(pack);
        let mut mate = EntitySnapshot::new(Uuid::new_v4(), Species::Wolf, Vec3::flat(3.0, 0.0));
        mate.pack_id = Some(pack);
        let stranger = EntitySnapshot::new(Uuid::new_v4(), Species::Wolf, Vec3::flat(5.0, 0.0));
        let sheep = EntitySnapshot::new(Uuid::new_v4(), Species::Sheep, Vec3::flat(1.0, 0.0));
        let neighbors = [mate, stranger, sheep];

        let ctx = BehaviorContext::new(1, me, &neighbors);
        let ids: Vec<_> = ctx.packmates().map(|m| m.id).collect();
        assert_eq!(ids, vec![mate.id]);
        assert_eq!(ctx.find(sheep.id).map(|s| s.species), Some(Species::Sheep));
    }

    #[test]
    fn test_visible_alpha_ignores_self() {
        let pack = PackId(Uuid::new_v4());
        let mut me = EntitySnapshot::new(Uuid::new_v4(), Species::Wolf, Vec3::ZERO);
        me.pack_id = Some(pack);
        let ctx = BehaviorContext::new(1, me, &[]).with_standing(PackStanding {
            pack_id: Some(pack),
            rank: Rank::Alpha,
            alpha_id: Some(me.id),
        });
        assert!(ctx.visible_alpha().is_none());
    }
}
