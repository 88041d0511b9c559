use crate::model::collaborators::{NeedsLedger, SignalLog, SpatialIndex};
use crate::model::config::AppConfig;
use crate::model::metrics::Metrics;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use wolfpack_core::systems::hunting::{PackHuntingBehavior, PackOrderBook};
use wolfpack_core::systems::siege::{Settlement, SiegeDecision, SiegeScheduler, WolfSiegeBehavior};
use wolfpack_core::systems::social::HierarchyBehavior;
use wolfpack_core::systems::territory::PackTerritoryBehavior;
use wolfpack_data::{AgentId, Climate, EntitySnapshot, PackId, PackRecord, Species, Vec3};

pub mod init;
pub mod persistence;
pub mod update;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Identity {
    pub id: AgentId,
    pub species: Species,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    pub position: Vec3,
    pub velocity: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vitals {
    pub health: f64,
    pub max_health: f64,
    pub juvenile: bool,
    pub tamed: bool,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            health: 20.0,
            max_health: 20.0,
            juvenile: false,
            tamed: false,
        }
    }
}

/// The engines one wolf runs, plus its attached record.
pub struct WolfMind {
    pub record: PackRecord,
    pub hierarchy: HierarchyBehavior,
    pub hunting: PackHuntingBehavior,
    pub territory: PackTerritoryBehavior,
    pub siege: WolfSiegeBehavior,
}

impl WolfMind {
    pub fn new(config: &AppConfig, record: PackRecord) -> Self {
        let mut territory = PackTerritoryBehavior::new(config.territory.clone());
        if let Some(center) = record.territory_center {
            territory.recenter(center);
        }
        let mut hierarchy = HierarchyBehavior::new(config.hierarchy.clone());
        hierarchy.tracker_mut().restore(record.rank, record.alpha_id);
        Self {
            record,
            hierarchy,
            hunting: PackHuntingBehavior::new(config.hunting.clone()),
            territory,
            siege: WolfSiegeBehavior::new(config.siege.clone()),
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// `(killer, victim)` pairs.
    pub kills: Vec<(AgentId, AgentId)>,
    pub siege_decisions: Vec<(PackId, SiegeDecision)>,
    pub collaborator_failures: u64,
}

pub struct World {
    pub tick: u64,
    pub width: u16,
    pub depth: u16,
    pub ecs: hecs::World,
    pub config: AppConfig,
    pub climate: Climate,
    pub rng: ChaCha8Rng,
    pub ledger: NeedsLedger,
    pub orders: PackOrderBook,
    pub schedulers: HashMap<PackId, SiegeScheduler>,
    pub settlements: Vec<Settlement>,
    pub signals: SignalLog,
    pub metrics: Metrics,
    index: SpatialIndex,
}

impl World {
    pub fn snapshot_of(&self, entity: hecs::Entity) -> Option<EntitySnapshot> {
        let mut query = self
            .ecs
            .query_one::<(&Identity, &Motion, &Vitals, Option<&WolfMind>)>(entity)
            .ok()?;
        let found = query
            .get()
            .map(|(identity, motion, vitals, mind)| snapshot(identity, motion, vitals, mind));
        found
    }

    pub fn find(&self, id: AgentId) -> Option<hecs::Entity> {
        self.ecs
            .query::<&Identity>()
            .iter()
            .find(|(_, identity)| identity.id == id)
            .map(|(entity, _)| entity)
    }

    pub fn count_species(&self, species: Species) -> usize {
        self.ecs
            .query::<&Identity>()
            .iter()
            .filter(|(_, identity)| identity.species == species)
            .count()
    }

    pub fn wolf_count(&self) -> usize {
        self.ecs.query::<&WolfMind>().iter().count()
    }

    /// Pack id to member ids, sorted.
    pub fn packs(&self) -> HashMap<PackId, Vec<AgentId>> {
        let mut packs: HashMap<PackId, Vec<AgentId>> = HashMap::new();
        for (_, (identity, mind)) in self.ecs.query::<(&Identity, &WolfMind)>().iter() {
            if let Some(pack) = mind.record.pack_id {
                packs.entry(pack).or_default().push(identity.id);
            }
        }
        for members in packs.values_mut() {
            members.sort();
        }
        packs
    }

    pub fn is_sieging(&self, pack: PackId) -> bool {
        self.schedulers.get(&pack).is_some_and(SiegeScheduler::is_sieging)
    }
}

pub(crate) fn snapshot(identity: &Identity, motion: &Motion, vitals: &Vitals, mind: Option<&WolfMind>) -> EntitySnapshot {
    EntitySnapshot {
        id: identity.id,
        species: identity.species,
        position: motion.position,
        velocity: motion.velocity,
        health: vitals.health,
        max_health: vitals.max_health,
        juvenile: vitals.juvenile,
        alive: vitals.health > 0.0,
        tamed: vitals.tamed,
        pack_id: mind.and_then(|m| m.record.pack_id),
    }
}

/// Clamps a point onto the world's ground rectangle.
pub(crate) fn bounded(p: Vec3, width: u16, depth: u16) -> Vec3 {
    Vec3::new(
        p.x.clamp(0.0, f64::from(width) - 0.001),
        p.y,
        p.z.clamp(0.0, f64::from(depth) - 0.001),
    )
}
