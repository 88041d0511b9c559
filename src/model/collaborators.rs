//! The reference host's implementations of the engine collaborators.

use crate::model::spatial_hash::SpatialHash;
use std::collections::HashMap;
use wolfpack_core::collaborators::{
    NeighborQuery, PreySelector, ResourceStore, Signal, SignalKind, SignalSink, ENERGY_KEY,
    HUNGER_KEY,
};
use wolfpack_core::context::BehaviorContext;
use wolfpack_core::error::{EngineError, Result};
use wolfpack_data::{AgentId, EntitySnapshot, Species, Vec3};

/// This tick's snapshots behind a spatial hash.
pub struct SpatialIndex {
    hash: SpatialHash,
    snapshots: Vec<EntitySnapshot>,
    positions: Vec<(f64, f64)>,
    by_id: HashMap<AgentId, usize>,
}

impl SpatialIndex {
    pub fn new(cell_size: f64, width: u16, depth: u16) -> Self {
        Self {
            hash: SpatialHash::new(cell_size, width, depth),
            snapshots: Vec::new(),
            positions: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    pub fn rebuild(&mut self, snapshots: Vec<EntitySnapshot>) {
        let data: Vec<(f64, f64, Species)> = snapshots
            .iter()
            .map(|s| (s.position.x, s.position.z, s.species))
            .collect();
        let (width, depth) = (self.hash.width, self.hash.depth);
        self.hash.build_with_species(&data, width, depth);
        self.positions = data.iter().map(|&(x, z, _)| (x, z)).collect();
        self.by_id = snapshots.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        self.snapshots = snapshots;
    }

    pub fn snapshots(&self) -> &[EntitySnapshot] {
        &self.snapshots
    }

    pub fn get(&self, id: AgentId) -> Option<&EntitySnapshot> {
        self.by_id.get(&id).and_then(|&i| self.snapshots.get(i))
    }

    /// Living entities within `radius` of `center`.
    pub fn within(&self, center: Vec3, radius: f64) -> Vec<&EntitySnapshot> {
        let mut found = Vec::new();
        self.hash.query_callback(center.x, center.z, radius, |idx| {
            if let Some(s) = self.snapshots.get(idx) {
                if s.alive && s.position.distance_to(center) <= radius {
                    found.push(s);
                }
            }
        });
        found
    }

    pub fn count_species_within(&self, center: Vec3, radius: f64, species: Species) -> usize {
        self.hash
            .count_species_within(center.x, center.z, radius, species, &self.positions)
    }
}

impl NeighborQuery for SpatialIndex {
    fn nearby(&self, agent: &EntitySnapshot, radius: f64, same_species_only: bool) -> Result<Vec<EntitySnapshot>> {
        if !agent.position.is_finite() {
            return Err(EngineError::collaborator(
                "neighbor index",
                format!("agent {} has a non-finite position", agent.id),
            ));
        }
        let mut found: Vec<EntitySnapshot> = self
            .within(agent.position, radius)
            .into_iter()
            .filter(|s| s.id != agent.id)
            .filter(|s| !same_species_only || s.species == agent.species)
            .copied()
            .collect();
        found.sort_by_key(|s| s.id);
        Ok(found)
    }
}

/// Energy and hunger per agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Needs {
    pub energy: f64,
    /// Fullness: 0 is starving, `max_hunger` is sated.
    pub hunger: f64,
}

#[derive(Debug, Default)]
pub struct NeedsLedger {
    needs: HashMap<AgentId, Needs>,
}

impl NeedsLedger {
    pub fn insert(&mut self, agent: AgentId, needs: Needs) {
        self.needs.insert(agent, needs);
    }

    pub fn get(&self, agent: AgentId) -> Option<Needs> {
        self.needs.get(&agent).copied()
    }

    pub fn remove(&mut self, agent: AgentId) {
        self.needs.remove(&agent);
    }

    pub fn len(&self) -> usize {
        self.needs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.needs.is_empty()
    }

    /// Passive recovery: energy regenerates, the stomach empties.
    pub fn decay(&mut self, energy_regen: f64, max_energy: f64, hunger_decay: f64) {
        for needs in self.needs.values_mut() {
            needs.energy = (needs.energy + energy_regen).min(max_energy);
            needs.hunger = (needs.hunger - hunger_decay).max(0.0);
        }
    }

    pub fn feed(&mut self, agent: AgentId, amount: f64, max_hunger: f64) {
        if let Some(needs) = self.needs.get_mut(&agent) {
            needs.hunger = (needs.hunger + amount).min(max_hunger);
        }
    }
}

impl ResourceStore for NeedsLedger {
    fn read(&self, agent: AgentId, key: &str) -> Result<Option<f64>> {
        let needs = self.needs.get(&agent);
        match key {
            ENERGY_KEY => Ok(needs.map(|n| n.energy)),
            HUNGER_KEY => Ok(needs.map(|n| n.hunger)),
            other => Err(EngineError::unknown_resource(other)),
        }
    }

    fn write(&mut self, agent: AgentId, key: &str, value: f64) -> Result<()> {
        let Some(needs) = self.needs.get_mut(&agent) else {
            return Err(EngineError::collaborator("needs ledger", format!("no record for {}", agent)));
        };
        match key {
            ENERGY_KEY => needs.energy = value,
            HUNGER_KEY => needs.hunger = value,
            other => return Err(EngineError::unknown_resource(other)),
        }
        Ok(())
    }
}

/// Closest living allowed prey within `radius`; ties go to the lower id.
pub struct NearestPreySelector<'a> {
    index: &'a SpatialIndex,
    radius: f64,
    species: &'a [Species],
}

impl<'a> NearestPreySelector<'a> {
    pub fn new(index: &'a SpatialIndex, radius: f64, species: &'a [Species]) -> Self {
        Self { index, radius, species }
    }
}

impl PreySelector for NearestPreySelector<'_> {
    fn select(&self, ctx: &BehaviorContext<'_>) -> Result<Option<EntitySnapshot>> {
        let here = ctx.position();
        let best = self
            .index
            .within(here, self.radius)
            .into_iter()
            .filter(|s| s.id != ctx.agent.id && !s.tamed && self.species.contains(&s.species))
            .min_by(|a, b| {
                here.distance_to(a.position)
                    .total_cmp(&here.distance_to(b.position))
                    .then_with(|| a.id.cmp(&b.id))
            });
        Ok(best.copied())
    }
}

/// Every signal emitted during a run, with per-kind totals.
#[derive(Debug, Default)]
pub struct SignalLog {
    recent: Vec<Signal>,
    totals: HashMap<SignalKind, u64>,
}

impl SignalLog {
    /// Signals since the last call.
    pub fn drain(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.recent)
    }

    pub fn total(&self, kind: SignalKind) -> u64 {
        self.totals.get(&kind).copied().unwrap_or(0)
    }
}

impl SignalSink for SignalLog {
    fn emit(&mut self, signal: Signal) {
        tracing::debug!(kind = ?signal.kind, source = %signal.source, tick = signal.tick, "Signal");
        *self.totals.entry(signal.kind).or_insert(0) += 1;
        self.recent.push(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn at(species: Species, x: f64, z: f64) -> EntitySnapshot {
        EntitySnapshot::new(Uuid::new_v4(), species, Vec3::flat(x, z))
    }

    fn index(snapshots: Vec<EntitySnapshot>) -> SpatialIndex {
        let mut index = SpatialIndex::new(8.0, 128, 128);
        index.rebuild(snapshots);
        index
    }

    #[test]
    fn test_nearby_excludes_self_and_far() {
        let wolf = at(Species::Wolf, 50.0, 50.0);
        let near = at(Species::Sheep, 55.0, 50.0);
        let far = at(Species::Sheep, 100.0, 50.0);
        let mate = at(Species::Wolf, 48.0, 50.0);
        let index = index(vec![wolf, near, far, mate]);

        let all = index.nearby(&wolf, 10.0, false).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|s| s.id != wolf.id));

        let kin = index.nearby(&wolf, 10.0, true).unwrap();
        assert_eq!(kin.len(), 1);
        assert_eq!(kin[0].id, mate.id);
    }

    #[test]
    fn test_ledger_reads_and_rejects_unknown_keys() {
        let id = Uuid::new_v4();
        let mut ledger = NeedsLedger::default();
        assert_eq!(ledger.read(id, ENERGY_KEY).unwrap(), None);
        ledger.insert(id, Needs { energy: 40.0, hunger: 10.0 });
        assert_eq!(ledger.read(id, HUNGER_KEY).unwrap(), Some(10.0));
        assert!(ledger.read(id, "mana").is_err());

        ledger.decay(0.05, 100.0, 0.01);
        let needs = ledger.get(id).unwrap();
        assert!((needs.energy - 40.05).abs() < 1e-12);
        assert!((needs.hunger - 9.99).abs() < 1e-12);

        ledger.feed(id, 500.0, 100.0);
        assert_eq!(ledger.get(id).unwrap().hunger, 100.0);
    }

    #[test]
    fn test_nearest_prey() {
        let wolf = at(Species::Wolf, 10.0, 10.0);
        let rabbit = at(Species::Rabbit, 20.0, 10.0);
        let sheep = at(Species::Sheep, 14.0, 10.0);
        let cow = at(Species::Cow, 11.0, 10.0);
        let index = index(vec![wolf, rabbit, sheep, cow]);
        let allowed = [Species::Sheep, Species::Rabbit];
        let selector = NearestPreySelector::new(&index, 48.0, &allowed);
        let ctx = BehaviorContext::new(1, wolf, &[]);
        assert_eq!(selector.select(&ctx).unwrap().map(|s| s.id), Some(sheep.id));
    }

    #[test]
    fn test_signal_log_totals() {
        let mut log = SignalLog::default();
        for kind in [SignalKind::AlertHowl, SignalKind::ScentMark, SignalKind::ScentMark] {
            log.emit(Signal {
                kind,
                source: Uuid::new_v4(),
                pack_id: None,
                position: Vec3::ZERO,
                tick: 3,
            });
        }
        assert_eq!(log.drain().len(), 3);
        assert!(log.drain().is_empty());
        assert_eq!(log.total(SignalKind::ScentMark), 2);
    }
}
