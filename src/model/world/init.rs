use crate::model::collaborators::{Needs, NeedsLedger, SignalLog, SpatialIndex};
use crate::model::config::AppConfig;
use crate::model::metrics::Metrics;
use crate::model::world::{bounded, Identity, Motion, Vitals, WolfMind, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use wolfpack_core::systems::hunting::PackOrderBook;
use wolfpack_core::systems::siege::Settlement;
use wolfpack_core::systems::social::{get_or_assign_pack_id, join_pack};
use wolfpack_data::{AgentId, Climate, PackId, PackRecord, Species, Vec3};

/// Agent id with a v4 layout drawn from the world RNG.
pub fn mint_agent_id<R: Rng + ?Sized>(rng: &mut R) -> AgentId {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

impl World {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let rng = if let Some(seed) = config.world.seed {
            ChaCha8Rng::seed_from_u64(seed)
        } else {
            ChaCha8Rng::from_entropy()
        };
        tracing::info!(
            width = config.world.width,
            depth = config.world.depth,
            seed = ?config.world.seed,
            fingerprint = %config.fingerprint(),
            "World created"
        );

        Ok(Self {
            tick: 0,
            width: config.world.width,
            depth: config.world.depth,
            ecs: hecs::World::new(),
            climate: Climate::default(),
            rng,
            ledger: NeedsLedger::default(),
            orders: PackOrderBook::default(),
            schedulers: HashMap::new(),
            settlements: Vec::new(),
            signals: SignalLog::default(),
            metrics: Metrics::new(),
            index: SpatialIndex::new(config.world.cell_size, config.world.width, config.world.depth),
            config,
        })
    }

    fn random_point_near(&mut self, center: Vec3, spread: f64) -> Vec3 {
        let x = center.x + self.rng.gen_range(-spread..=spread);
        let z = center.z + self.rng.gen_range(-spread..=spread);
        self.clamp_to_bounds(Vec3::flat(x, z))
    }

    pub fn random_point(&mut self) -> Vec3 {
        let x = self.rng.gen_range(1.0..f64::from(self.width) - 1.0);
        let z = self.rng.gen_range(1.0..f64::from(self.depth) - 1.0);
        Vec3::flat(x, z)
    }

    pub(crate) fn clamp_to_bounds(&self, p: Vec3) -> Vec3 {
        bounded(p, self.width, self.depth)
    }

    /// Spawns a non-wolf entity.
    pub fn spawn_agent(&mut self, species: Species, position: Vec3, vitals: Vitals) -> AgentId {
        let id = mint_agent_id(&mut self.rng);
        let position = self.clamp_to_bounds(position);
        self.ecs.spawn((
            Identity { id, species },
            Motion {
                position,
                velocity: Vec3::ZERO,
            },
            vitals,
        ));
        id
    }

    /// Spawns a wolf carrying `record`, with full energy and an empty stomach.
    pub fn spawn_wolf(&mut self, position: Vec3, vitals: Vitals, record: PackRecord) -> AgentId {
        let id = mint_agent_id(&mut self.rng);
        let mind = WolfMind::new(&self.config, record);
        let position = self.clamp_to_bounds(position);
        self.ecs.spawn((
            Identity {
                id,
                species: Species::Wolf,
            },
            Motion {
                position,
                velocity: Vec3::ZERO,
            },
            vitals,
            mind,
        ));
        self.ledger.insert(
            id,
            Needs {
                energy: self.config.world.max_energy,
                hunger: 0.0,
            },
        );
        id
    }

    /// A new pack of `size` adults around `den`. The first wolf founds the
    /// pack and the rest join it; the den becomes the shared territory center.
    pub fn spawn_pack(&mut self, den: Vec3, size: usize) -> (PackId, Vec<AgentId>) {
        let mut founder = PackRecord {
            territory_center: Some(den),
            ..Default::default()
        };
        let pack = get_or_assign_pack_id(&mut founder, &mut self.rng);
        let mut members = Vec::with_capacity(size);
        for i in 0..size {
            let mut record = if i == 0 { founder } else { PackRecord::default() };
            join_pack(&mut record, pack, founder.territory_center);
            let health = self.rng.gen_range(12.0..=20.0);
            let position = self.random_point_near(den, 4.0);
            members.push(self.spawn_wolf(
                position,
                Vitals {
                    health,
                    ..Default::default()
                },
                record,
            ));
        }
        tracing::info!(pack = %pack, size, x = den.x, z = den.z, "Pack spawned");
        (pack, members)
    }

    /// A herd of `count` prey scattered around `center`.
    pub fn spawn_herd(&mut self, species: Species, center: Vec3, count: usize) -> Vec<AgentId> {
        (0..count)
            .map(|_| {
                let position = self.random_point_near(center, 8.0);
                self.spawn_agent(species, position, Vitals::default())
            })
            .collect()
    }

    /// A settlement with villagers, livestock and guardians inside its radius.
    pub fn spawn_settlement(&mut self, center: Vec3, villagers: usize, livestock: usize, guardians: usize) -> Settlement {
        let radius = self.config.siege.settlement_radius;
        let settlement = Settlement { center, radius };
        let inner = radius * 0.5;
        for i in 0..villagers {
            let position = self.random_point_near(center, inner);
            let vitals = Vitals {
                juvenile: i % 3 == 0,
                ..Default::default()
            };
            self.spawn_agent(Species::Villager, position, vitals);
        }
        let kinds = [Species::Cow, Species::Pig, Species::Chicken, Species::Sheep];
        for i in 0..livestock {
            let position = self.random_point_near(center, inner);
            self.spawn_agent(kinds[i % kinds.len()], position, Vitals::default());
        }
        for _ in 0..guardians {
            let position = self.random_point_near(center, inner);
            let vitals = Vitals {
                health: 100.0,
                max_health: 100.0,
                ..Default::default()
            };
            self.spawn_agent(Species::IronGolem, position, vitals);
        }
        self.settlements.push(settlement);
        settlement
    }

    /// Scatters packs and wild prey over the whole map.
    pub fn populate(&mut self, packs: usize, wolves_per_pack: usize, prey: usize) {
        for _ in 0..packs {
            let den = self.random_point();
            self.spawn_pack(den, wolves_per_pack);
        }
        let wild = self.config.hunting.prey_species.clone();
        if wild.is_empty() {
            return;
        }
        let herd_size = self.config.world.prey_floor.max(4);
        let mut remaining = prey;
        let mut i = 0;
        while remaining > 0 {
            let count = remaining.min(herd_size);
            let center = self.random_point();
            self.spawn_herd(wild[i % wild.len()], center, count);
            remaining -= count;
            i += 1;
        }
    }
}
