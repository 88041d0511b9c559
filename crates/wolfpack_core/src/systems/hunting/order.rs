//! Distance-to-prey ordering of a pack, cached per pack.

use std::collections::{BTreeSet, HashMap};
use wolfpack_data::{AgentId, EntitySnapshot, PackId};

/// Packmates sorted by distance to the prey, closest first, with the
/// membership and prey it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct PackOrder {
    snapshot: Vec<AgentId>,
    built_from: BTreeSet<AgentId>,
    prey: AgentId,
    built_at: u64,
}

impl PackOrder {
    /// Sorts by `(distance, id)` so equal distances still order the same way
    /// for every caller.
    pub fn build(members: &[EntitySnapshot], prey: &EntitySnapshot, now: u64) -> Self {
        let mut ranked: Vec<(f64, AgentId)> = members
            .iter()
            .map(|m| (m.position.distance_to(prey.position), m.id))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        ranked.dedup_by_key(|(_, id)| *id);

        Self {
            built_from: ranked.iter().map(|(_, id)| *id).collect(),
            snapshot: ranked.into_iter().map(|(_, id)| id).collect(),
            prey: prey.id,
            built_at: now,
        }
    }

    /// Valid while the TTL has not elapsed, the prey is unchanged and the
    /// membership is exactly the one the order was built from.
    pub fn is_valid(&self, members: &BTreeSet<AgentId>, prey: AgentId, now: u64, ttl: u64) -> bool {
        now.saturating_sub(self.built_at) < ttl && self.prey == prey && &self.built_from == members
    }

    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.snapshot.iter().position(|m| *m == id)
    }

    pub fn snapshot(&self) -> &[AgentId] {
        &self.snapshot
    }

    pub fn built_at(&self) -> u64 {
        self.built_at
    }
}

/// Index of `agent` in the distance order, computed directly without sorting.
pub fn fresh_index(members: &[EntitySnapshot], prey: &EntitySnapshot, agent: AgentId) -> Option<usize> {
    let me = members.iter().find(|m| m.id == agent)?;
    let my_key = (me.position.distance_to(prey.position), me.id);
    let ahead = members
        .iter()
        .filter(|m| m.id != agent)
        .filter(|m| {
            let d = m.position.distance_to(prey.position);
            d.total_cmp(&my_key.0).then_with(|| m.id.cmp(&my_key.1)).is_lt()
        })
        .count();
    Some(ahead)
}

/// One cached [`PackOrder`] per pack.
#[derive(Debug, Default)]
pub struct PackOrderBook {
    orders: HashMap<PackId, PackOrder>,
    rebuilds: u64,
}

impl PackOrderBook {
    /// Index of `agent` among `members` (which must include the agent),
    /// rebuilding the pack's order first if it is stale.
    pub fn index_for(
        &mut self,
        pack: PackId,
        members: &[EntitySnapshot],
        prey: &EntitySnapshot,
        agent: AgentId,
        now: u64,
        ttl: u64,
    ) -> Option<usize> {
        let membership: BTreeSet<AgentId> = members.iter().map(|m| m.id).collect();
        let stale = self
            .orders
            .get(&pack)
            .map_or(true, |order| !order.is_valid(&membership, prey.id, now, ttl));
        if stale {
            self.orders.insert(pack, PackOrder::build(members, prey, now));
            self.rebuilds += 1;
        }
        self.orders.get(&pack).and_then(|order| order.index_of(agent))
    }

    pub fn get(&self, pack: &PackId) -> Option<&PackOrder> {
        self.orders.get(pack)
    }

    pub fn invalidate(&mut self, pack: &PackId) {
        self.orders.remove(pack);
    }

    /// Drops orders for packs that no longer exist.
    pub fn retain_packs(&mut self, live: &BTreeSet<PackId>) {
        self.orders.retain(|pack, _| live.contains(pack));
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
