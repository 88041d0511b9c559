pub mod macros;

use uuid::Uuid;
use wolfpack_core::systems::social::join_pack;
use wolfpack_data::{AgentId, HuntingState, PackId, PackRecord, Rank, Season, Vec3, Weather};
use wolfpack_lib::model::collaborators::Needs;
use wolfpack_lib::model::config::AppConfig;
use wolfpack_lib::model::world::{Identity, Motion, Vitals, WolfMind, World};

#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    season: Season,
    weather: Weather,
}

#[allow(dead_code)]
impl WorldBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.seed = Some(42);
        config.world.deterministic = true;
        Self {
            config,
            season: Season::Spring,
            weather: Weather::Clear,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn winter(mut self) -> Self {
        self.season = Season::Winter;
        self
    }

    pub fn blizzard(mut self) -> Self {
        self.season = Season::Winter;
        self.weather = Weather::Blizzard;
        self
    }

    pub fn build(self) -> World {
        let mut world = World::new(self.config).expect("Failed to create world");
        world.climate.season = self.season;
        world.climate.weather = self.weather;
        world
    }
}

/// Spawns one adult wolf into `pack` with the given health out of 20.
#[allow(dead_code)]
pub fn spawn_member(world: &mut World, pack: PackId, position: Vec3, health: f64, juvenile: bool) -> AgentId {
    let mut record = PackRecord::default();
    join_pack(&mut record, pack, Some(position));
    world.spawn_wolf(
        position,
        Vitals {
            health,
            juvenile,
            ..Default::default()
        },
        record,
    )
}

#[allow(dead_code)]
pub fn new_pack() -> PackId {
    PackId(Uuid::new_v4())
}

#[allow(dead_code)]
pub fn run(world: &mut World, ticks: u64) {
    for _ in 0..ticks {
        world.update().expect("Update failed");
    }
}

#[allow(dead_code)]
pub fn record_of(world: &World, id: AgentId) -> PackRecord {
    world
        .ecs
        .query::<(&Identity, &WolfMind)>()
        .iter()
        .find(|(_, (identity, _))| identity.id == id)
        .map(|(_, (_, mind))| mind.record)
        .expect("Wolf not found in world")
}

#[allow(dead_code)]
pub fn rank_of(world: &World, id: AgentId) -> Rank {
    record_of(world, id).rank
}

#[allow(dead_code)]
pub fn hunting_state(world: &World, id: AgentId) -> HuntingState {
    world
        .ecs
        .query::<(&Identity, &WolfMind)>()
        .iter()
        .find(|(_, (identity, _))| identity.id == id)
        .map(|(_, (_, mind))| mind.hunting.state())
        .expect("Wolf not found in world")
}

#[allow(dead_code)]
pub fn position_of(world: &World, id: AgentId) -> Vec3 {
    world
        .ecs
        .query::<(&Identity, &Motion)>()
        .iter()
        .find(|(_, (identity, _))| identity.id == id)
        .map(|(_, (_, motion))| motion.position)
        .expect("Entity not found in world")
}

#[allow(dead_code)]
pub fn set_needs(world: &mut World, id: AgentId, energy: f64, hunger: f64) {
    world.ledger.insert(id, Needs { energy, hunger });
}

/// `(id, position)` of every entity, sorted by id.
#[allow(dead_code)]
pub fn positions(world: &World) -> Vec<(AgentId, Vec3)> {
    let mut all: Vec<(AgentId, Vec3)> = world
        .ecs
        .query::<(&Identity, &Motion)>()
        .iter()
        .map(|(_, (identity, motion))| (identity.id, motion.position))
        .collect();
    all.sort_by_key(|(id, _)| *id);
    all
}
