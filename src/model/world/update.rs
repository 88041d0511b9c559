use crate::model::collaborators::NearestPreySelector;
use crate::model::metrics::{COLLABORATOR_FAILURES, HOWLS, KILLS, SCENT_MARKS, SIEGES_ENDED, SIEGES_STARTED};
use crate::model::world::{bounded, snapshot, Identity, Motion, TickReport, Vitals, WolfMind, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;
use wolfpack_core::collaborators::{nearby_or_empty, SignalKind};
use wolfpack_core::context::BehaviorContext;
use wolfpack_core::steering::{seek, Services, SteeringBehavior};
use wolfpack_core::systems::hunting::LocalDensityFloor;
use wolfpack_core::systems::siege::{PackSurvey, Settlement, SiegeDecision, SiegeScheduler};
use wolfpack_data::{AgentId, EntitySnapshot, HuntingState, PackId, Rank, Species, Vec3};
use wolfpack_data::data::environment::DAY_LENGTH;

const WANDER_JITTER: f64 = 0.05;
const WANDER_SPEED: f64 = 0.3;

impl World {
    /// Advances the world by one tick:
    /// - spatial index rebuild and snapshots
    /// - siege scheduling per pack
    /// - every wolf's behaviors, force composition and strikes
    /// - prey wandering and passive resource recovery
    pub fn update(&mut self) -> anyhow::Result<TickReport> {
        let started = Instant::now();
        self.tick += 1;
        self.climate.day_time = (self.climate.day_time + 1) % DAY_LENGTH;
        if self.config.world.deterministic {
            let seed = self
                .config
                .world
                .seed
                .unwrap_or(0)
                .wrapping_add(self.tick)
                .wrapping_add(0x5EED);
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }

        let mut report = TickReport::default();
        self.pass_spatial_indexing();
        self.pass_siege_scheduling(&mut report);
        let killed = self.pass_wolves(&mut report)?;
        self.pass_wander();
        self.ledger.decay(
            self.config.world.energy_regen,
            self.config.world.max_energy,
            self.config.world.hunger_decay,
        );
        self.finalize_tick(&killed, &report, started);
        Ok(report)
    }

    fn pass_spatial_indexing(&mut self) {
        let mut snapshots: Vec<EntitySnapshot> = self
            .ecs
            .query::<(&Identity, &Motion, &Vitals, Option<&WolfMind>)>()
            .iter()
            .map(|(_, (identity, motion, vitals, mind))| snapshot(identity, motion, vitals, mind))
            .collect();
        snapshots.sort_by_key(|s| s.id);
        self.index.rebuild(snapshots);
    }

    /// Nearest known settlement within `radius` of `point`.
    fn settlement_near(&self, point: Vec3, radius: f64) -> Option<Settlement> {
        self.settlements
            .iter()
            .filter(|s| s.center.distance_to(point) <= radius)
            .min_by(|a, b| a.center.distance_to(point).total_cmp(&b.center.distance_to(point)))
            .copied()
    }

    fn survey(&self, pack: PackId, members: &[AgentId], engaged: Option<Settlement>) -> PackSurvey {
        let living: Vec<&EntitySnapshot> = members
            .iter()
            .filter_map(|id| self.index.get(*id))
            .filter(|s| s.alive)
            .collect();

        let alpha_id = self
            .ecs
            .query::<(&Identity, &WolfMind)>()
            .iter()
            .filter(|(_, (_, mind))| mind.record.pack_id == Some(pack))
            .find(|(_, (_, mind))| mind.hierarchy.tracker().rank() == Rank::Alpha)
            .map(|(_, (identity, _))| identity.id);

        let max_hunger = self.config.world.max_hunger;
        let hungers: Vec<f64> = living
            .iter()
            .filter_map(|s| self.ledger.get(s.id))
            .map(|needs| needs.hunger / max_hunger * 100.0)
            .collect();
        let average_hunger = if hungers.is_empty() {
            100.0
        } else {
            hungers.iter().sum::<f64>() / hungers.len() as f64
        };

        let settlement = engaged.or_else(|| {
            if living.is_empty() {
                return None;
            }
            let centroid =
                living.iter().map(|s| s.position).sum::<Vec3>() * (1.0 / living.len() as f64);
            self.settlement_near(centroid, self.config.scheduler.settlement_search_radius)
        });
        let guardians = settlement.map_or(0, |s| {
            self.index.count_species_within(
                s.center,
                self.config.scheduler.guardian_count_radius,
                Species::IronGolem,
            )
        });

        PackSurvey {
            pack_id: Some(pack),
            member_ids: living.iter().map(|s| s.id).collect(),
            alpha_id,
            average_hunger,
            settlement,
            guardians,
        }
    }

    fn pass_siege_scheduling(&mut self, report: &mut TickReport) {
        let packs = self.packs();
        self.schedulers.retain(|pack, _| packs.contains_key(pack));
        let mut ids: Vec<PackId> = packs.keys().copied().collect();
        ids.sort();

        for pack in ids {
            let engaged = self
                .schedulers
                .get(&pack)
                .and_then(|s| s.active())
                .map(|a| a.settlement);
            let survey = self.survey(pack, &packs[&pack], engaged);
            let scheduler = self
                .schedulers
                .entry(pack)
                .or_insert_with(|| SiegeScheduler::new(self.config.scheduler.clone()));
            let decision = scheduler.update(self.tick, &survey, &self.climate, &mut self.rng);

            match decision {
                SiegeDecision::Idle | SiegeDecision::Continue => continue,
                SiegeDecision::Begin(siege) => {
                    for (_, mind) in self.ecs.query_mut::<&mut WolfMind>() {
                        if mind.record.pack_id == Some(pack) {
                            mind.siege.engage(siege.settlement, siege.siege_type);
                        }
                    }
                    self.metrics.increment_counter(SIEGES_STARTED);
                }
                SiegeDecision::Retreat(_) => {
                    for (_, mind) in self.ecs.query_mut::<&mut WolfMind>() {
                        if mind.record.pack_id == Some(pack) {
                            mind.siege.disengage();
                        }
                    }
                    self.metrics.increment_counter(SIEGES_ENDED);
                }
            }
            report.siege_decisions.push((pack, decision));
        }
    }

    fn pass_wolves(&mut self, report: &mut TickReport) -> anyhow::Result<HashSet<AgentId>> {
        let mut wolves: Vec<(hecs::Entity, AgentId)> = self
            .ecs
            .query::<(&Identity, &WolfMind)>()
            .iter()
            .map(|(entity, (identity, _))| (entity, identity.id))
            .collect();
        wolves.sort_by_key(|(_, id)| *id);

        let Self {
            ecs,
            index,
            ledger,
            orders,
            signals,
            config,
            climate,
            metrics,
            tick,
            width,
            depth,
            ..
        } = self;
        let tick = *tick;
        let (width, depth) = (*width, *depth);
        let population = LocalDensityFloor::new(&*index, config.world.prey_floor, config.world.density_radius);
        let selector = NearestPreySelector::new(&*index, config.hunting.coordination_range, &config.hunting.prey_species);
        let weights = &config.weights;

        let mut rosters: HashMap<PackId, Vec<EntitySnapshot>> = HashMap::new();
        for s in index.snapshots() {
            if let (Species::Wolf, true, false, Some(pack)) = (s.species, s.alive, s.tamed, s.pack_id) {
                rosters.entry(pack).or_default().push(*s);
            }
        }

        let mut moves: Vec<(hecs::Entity, Motion)> = Vec::with_capacity(wolves.len());
        let mut killed: HashSet<AgentId> = HashSet::new();

        for (entity, id) in wolves {
            let Some(agent) = index.get(id).copied() else {
                continue;
            };
            let mut failures = 0;
            let neighbors = nearby_or_empty(&*index, &agent, config.world.perception_radius, false, &mut failures);

            let mut mind = ecs.get::<&mut WolfMind>(entity)?;
            let due = mind.hierarchy.tracker().is_due(tick);
            let standing = mind.hierarchy.refresh(tick, &agent, &neighbors);
            if due {
                mind.record.rank = standing.rank;
                mind.record.alpha_id = standing.alpha_id;
                mind.record.last_rank_tick = tick;
            }

            let roster = agent
                .pack_id
                .and_then(|pack| rosters.get(&pack))
                .map_or(&[][..], Vec::as_slice);
            let ctx = BehaviorContext::new(tick, agent, &neighbors)
                .with_pack(roster)
                .with_limits(config.world.max_speed, config.world.max_force)
                .with_standing(standing)
                .with_climate(*climate);
            let mut services = Services {
                resources: &mut *ledger,
                prey: &selector,
                population: &population,
                signals: &mut *signals,
                orders: &mut *orders,
                failures,
            };

            let sieging = mind.siege.is_engaged();
            let mut force = mind.hierarchy.calculate(&ctx, &mut services) * weights.hierarchy;
            if sieging {
                force += mind.siege.calculate(&ctx, &mut services) * weights.siege;
            } else {
                force += mind.hunting.calculate(&ctx, &mut services) * weights.hunting;
                force += mind.territory.calculate(&ctx, &mut services) * weights.territory;
                if mind.record.territory_center.is_none() {
                    mind.record.territory_center = mind.territory.center();
                }
            }
            report.collaborator_failures += services.failures;

            let speed_cap = if sieging {
                if climate.is_blizzard() && standing.rank == Rank::Beta {
                    config.world.max_speed * (1.0 + config.siege.weather_boost)
                } else {
                    config.world.max_speed
                }
            } else if mind.hunting.state().is_pursuing() {
                config.hunting.pursuit_speed
            } else {
                config.world.max_speed
            };
            let velocity = if force.is_finite() {
                (agent.velocity + force).limit(speed_cap)
            } else {
                agent.velocity.limit(speed_cap)
            };
            moves.push((
                entity,
                Motion {
                    position: bounded(agent.position + velocity, width, depth),
                    velocity,
                },
            ));

            let victim = if sieging {
                mind.siege.target()
            } else if mind.hunting.state() == HuntingState::Attacking {
                mind.hunting.session().target
            } else {
                None
            };
            let Some(victim) = victim.and_then(|v| index.get(v)) else {
                continue;
            };
            let reachable = agent.distance_to(victim) <= config.hunting.strike_distance;
            if !victim.alive || !reachable || killed.contains(&victim.id) || victim.species == Species::IronGolem {
                continue;
            }
            killed.insert(victim.id);
            report.kills.push((id, victim.id));
            if !sieging {
                mind.hunting.on_successful_kill(id, &mut *ledger);
            }
            ledger.feed(id, config.world.kill_food_value, config.world.max_hunger);
            metrics.increment_counter(KILLS);
            tracing::debug!(hunter = %id, prey = %victim.id, species = ?victim.species, sieging, "Kill");
        }

        for (entity, motion) in moves {
            if let Ok(mut m) = ecs.get::<&mut Motion>(entity) {
                *m = motion;
            }
        }
        Ok(killed)
    }

    /// Non-wolves drift at random; settlement dwellers stay inside their
    /// settlement.
    fn pass_wander(&mut self) {
        let Self {
            ecs,
            rng,
            settlements,
            width,
            depth,
            ..
        } = self;
        for (_, (identity, motion)) in ecs.query_mut::<(&Identity, &mut Motion)>() {
            if identity.species == Species::Wolf {
                continue;
            }
            let jitter = Vec3::flat(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)) * WANDER_JITTER;
            let mut velocity = motion.velocity + jitter;
            let dwells = !matches!(identity.species, Species::Rabbit | Species::Fox | Species::Player);
            if dwells {
                let home = settlements
                    .iter()
                    .filter(|s| s.center.distance_to(motion.position) <= s.radius * 1.5)
                    .find(|s| s.center.distance_to(motion.position) > s.radius);
                if let Some(home) = home {
                    velocity += seek(motion.position, motion.velocity, home.center, WANDER_SPEED, WANDER_JITTER);
                }
            }
            motion.velocity = velocity.limit(WANDER_SPEED);
            motion.position = bounded(motion.position + motion.velocity, *width, *depth);
        }
    }

    fn finalize_tick(&mut self, killed: &HashSet<AgentId>, report: &TickReport, started: Instant) {
        if !killed.is_empty() {
            let doomed: Vec<(hecs::Entity, AgentId)> = self
                .ecs
                .query::<&Identity>()
                .iter()
                .filter(|(_, identity)| killed.contains(&identity.id))
                .map(|(entity, identity)| (entity, identity.id))
                .collect();
            for (entity, id) in doomed {
                if self.ecs.despawn(entity).is_ok() {
                    self.ledger.remove(id);
                }
            }
        }

        let live: BTreeSet<PackId> = self.packs().into_keys().collect();
        self.orders.retain_packs(&live);

        for signal in self.signals.drain() {
            match signal.kind {
                SignalKind::AlertHowl | SignalKind::BondingHowl => self.metrics.increment_counter(HOWLS),
                SignalKind::ScentMark => self.metrics.increment_counter(SCENT_MARKS),
            }
        }
        if report.collaborator_failures > 0 {
            self.metrics.add_to_counter(COLLABORATOR_FAILURES, report.collaborator_failures);
        }

        let wolves = self.wolf_count();
        let others = self.ecs.len() as usize - wolves;
        self.metrics.record_tick(started.elapsed(), wolves, others);
    }
}
