//! Configuration for the pack engine and the reference host.
//!
//! Every tunable threshold of the hierarchy, hunting, territory and siege
//! engines lives here so that a host can override it from `config.toml`.
//! Ticks are simulation ticks (20 per simulated second).
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 256
//! depth = 256
//! seed = 42
//! deterministic = true
//!
//! [hunting]
//! hunt_energy_cost = 30.0
//! satiation_threshold = 80.0
//!
//! [territory]
//! outer_radius = 64.0
//! core_radius = 32.0
//! ```

use serde::{Deserialize, Serialize};
use wolfpack_data::Species;

/// Host world parameters and the passive resource model.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u16,
    pub depth: u16,
    pub seed: Option<u64>,
    pub deterministic: bool,
    pub cell_size: f64,
    /// Radius of the neighbor list handed to every behavior.
    pub perception_radius: f64,
    pub max_speed: f64,
    pub max_force: f64,
    /// Minimum same-species head count near a prey for it to be huntable.
    pub prey_floor: usize,
    pub density_radius: f64,
    pub max_energy: f64,
    pub energy_regen: f64,
    pub max_hunger: f64,
    pub hunger_decay: f64,
    pub kill_food_value: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 256,
            depth: 256,
            seed: None,
            deterministic: false,
            cell_size: 8.0,
            perception_radius: 48.0,
            max_speed: 1.0,
            max_force: 0.2,
            prey_floor: 3,
            density_radius: 32.0,
            max_energy: 100.0,
            energy_regen: 0.05,
            max_hunger: 100.0,
            hunger_decay: 0.01,
            kill_food_value: 60.0,
        }
    }
}

/// Rank evaluation and pack cohesion.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HierarchyConfig {
    pub eval_interval: u64,
    /// Upper bound of the tie-breaking term added to each strength score.
    pub strength_jitter: f64,
    pub juvenile_age_factor: f64,
    pub cohesion_distance: f64,
    pub follow_distance: f64,
    pub follow_strength: f64,
    pub bonding_howl: bool,
    pub bonding_howl_interval: u64,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            eval_interval: 100,
            strength_jitter: 0.1,
            juvenile_age_factor: 0.5,
            cohesion_distance: 24.0,
            follow_distance: 4.0,
            follow_strength: 0.15,
            bonding_howl: true,
            bonding_howl_interval: 2400,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HuntingConfig {
    pub pursuit_speed: f64,
    pub max_force: f64,
    pub follower_speed_factor: f64,
    /// Base angular offset between flankers, radians.
    pub flanking_angle: f64,
    pub min_flank_distance: f64,
    pub flank_distance_factor: f64,
    pub coordination_range: f64,
    pub min_pack_size: usize,
    pub assembly_distance: f64,
    pub strike_distance: f64,
    pub hunt_energy_cost: f64,
    /// Value assumed for energy when the host has no record.
    pub full_energy: f64,
    pub satiation_threshold: f64,
    pub handling_ticks: u64,
    pub give_up_ticks: u64,
    pub rest_ticks: u64,
    pub order_ttl_ticks: u64,
    pub prey_species: Vec<Species>,
}

impl Default for HuntingConfig {
    fn default() -> Self {
        Self {
            pursuit_speed: 1.3,
            max_force: 0.18,
            follower_speed_factor: 0.9,
            flanking_angle: std::f64::consts::FRAC_PI_3,
            min_flank_distance: 8.0,
            flank_distance_factor: 0.7,
            coordination_range: 48.0,
            min_pack_size: 2,
            assembly_distance: 24.0,
            strike_distance: 1.5,
            hunt_energy_cost: 30.0,
            full_energy: 100.0,
            satiation_threshold: 80.0,
            handling_ticks: 600,
            give_up_ticks: 600,
            rest_ticks: 200,
            order_ttl_ticks: 100,
            prey_species: vec![Species::Sheep, Species::Rabbit, Species::Fox],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TerritoryConfig {
    pub outer_radius: f64,
    pub core_radius: f64,
    pub defense_force: f64,
    pub patrol_speed: f64,
    pub howl_cooldown: u64,
    pub scent_interval: u64,
    /// Fraction of the outer radius past which the agent marks and turns back.
    pub boundary_fraction: f64,
    /// Fraction of the core radius inside which the agent is pushed outward.
    pub inner_fraction: f64,
}

impl Default for TerritoryConfig {
    fn default() -> Self {
        Self {
            outer_radius: 64.0,
            core_radius: 32.0,
            defense_force: 0.2,
            patrol_speed: 0.6,
            howl_cooldown: 600,
            scent_interval: 1200,
            boundary_fraction: 0.8,
            inner_fraction: 0.5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SiegeConfig {
    pub livestock_priority: f64,
    pub child_priority: f64,
    pub adult_priority: f64,
    pub guardian_priority: f64,
    pub scout_isolation_modifier: f64,
    pub isolation_radius: f64,
    pub commander_min_standoff: f64,
    pub commander_max_standoff: f64,
    pub commander_retreat_factor: f64,
    pub guard_radius: f64,
    /// Fraction of the settlement radius at which guards start intercepting.
    pub perimeter_band: f64,
    pub post_tolerance: f64,
    pub weather_boost: f64,
    pub settlement_radius: f64,
    pub center_seek_factor: f64,
}

impl Default for SiegeConfig {
    fn default() -> Self {
        Self {
            livestock_priority: 1.0,
            child_priority: 0.8,
            adult_priority: 0.6,
            guardian_priority: 0.3,
            scout_isolation_modifier: 1.2,
            isolation_radius: 16.0,
            commander_min_standoff: 16.0,
            commander_max_standoff: 32.0,
            commander_retreat_factor: 0.1,
            guard_radius: 8.0,
            perimeter_band: 0.75,
            post_tolerance: 2.0,
            weather_boost: 0.15,
            settlement_radius: 32.0,
            center_seek_factor: 0.5,
        }
    }
}

/// Winter siege trigger and retreat rules.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SchedulerConfig {
    pub check_interval: u64,
    pub min_pack_size: usize,
    pub settlement_search_radius: f64,
    pub guardian_count_radius: f64,
    pub base_chance: f64,
    pub blizzard_chance: f64,
    pub night_multiplier: f64,
    pub moderate_pressure: f64,
    pub moderate_multiplier: f64,
    pub desperate_pressure: f64,
    pub desperate_multiplier: f64,
    pub guardian_threat_pack_size: usize,
    pub retreat_casualty_fraction: f64,
    pub retreat_pressure: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval: 24_000,
            min_pack_size: 3,
            settlement_search_radius: 128.0,
            guardian_count_radius: 48.0,
            base_chance: 0.05,
            blizzard_chance: 0.10,
            night_multiplier: 2.0,
            moderate_pressure: 60.0,
            moderate_multiplier: 1.5,
            desperate_pressure: 80.0,
            desperate_multiplier: 2.0,
            guardian_threat_pack_size: 8,
            retreat_casualty_fraction: 0.5,
            retreat_pressure: 30.0,
        }
    }
}

/// Weights the host applies when summing behavior forces.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WeightConfig {
    pub hierarchy: f64,
    pub hunting: f64,
    pub territory: f64,
    pub siege: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            hierarchy: 1.0,
            hunting: 1.5,
            territory: 1.0,
            siege: 1.5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub hierarchy: HierarchyConfig,
    pub hunting: HuntingConfig,
    pub territory: TerritoryConfig,
    pub siege: SiegeConfig,
    pub scheduler: SchedulerConfig,
    pub weights: WeightConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World
        anyhow::ensure!(self.world.width > 0, "World width must be positive");
        anyhow::ensure!(self.world.depth > 0, "World depth must be positive");
        anyhow::ensure!(self.world.cell_size > 0.0, "Cell size must be positive");
        anyhow::ensure!(
            self.world.perception_radius > 0.0,
            "Perception radius must be positive"
        );
        anyhow::ensure!(
            self.world.max_speed > 0.0 && self.world.max_force > 0.0,
            "Max speed and max force must be positive"
        );
        anyhow::ensure!(
            self.world.max_energy > 0.0 && self.world.max_hunger > 0.0,
            "Resource maxima must be positive"
        );
        anyhow::ensure!(
            self.world.energy_regen >= 0.0 && self.world.hunger_decay >= 0.0,
            "Resource rates must be non-negative"
        );

        // Hierarchy
        anyhow::ensure!(
            self.hierarchy.eval_interval > 0,
            "Rank evaluation interval must be positive"
        );
        anyhow::ensure!(
            self.hierarchy.strength_jitter >= 0.0 && self.hierarchy.strength_jitter < 1.0,
            "Strength jitter must be in [0.0, 1.0)"
        );
        anyhow::ensure!(
            self.hierarchy.juvenile_age_factor > 0.0 && self.hierarchy.juvenile_age_factor <= 1.0,
            "Juvenile age factor must be in (0.0, 1.0]"
        );
        anyhow::ensure!(
            self.hierarchy.follow_distance < self.hierarchy.cohesion_distance,
            "Follow distance must be below cohesion distance"
        );

        // Hunting
        anyhow::ensure!(
            self.hunting.pursuit_speed > 0.0 && self.hunting.max_force > 0.0,
            "Pursuit speed and force must be positive"
        );
        anyhow::ensure!(
            self.hunting.strike_distance < self.hunting.assembly_distance,
            "Strike distance must be below assembly distance"
        );
        anyhow::ensure!(
            self.hunting.min_pack_size >= 1,
            "Minimum hunting pack size must be at least 1"
        );
        anyhow::ensure!(
            self.hunting.hunt_energy_cost >= 0.0,
            "Hunt energy cost must be non-negative"
        );
        anyhow::ensure!(
            self.hunting.full_energy >= self.hunting.hunt_energy_cost,
            "Full energy must cover one hunt"
        );
        anyhow::ensure!(
            self.hunting.give_up_ticks > 0 && self.hunting.order_ttl_ticks > 0,
            "Hunt give-up and order TTL must be positive"
        );
        anyhow::ensure!(
            !self.hunting.prey_species.is_empty(),
            "Prey allow-list must not be empty"
        );
        anyhow::ensure!(
            !self.hunting.prey_species.contains(&Species::Player),
            "Players can never be prey"
        );

        // Territory
        anyhow::ensure!(
            self.territory.core_radius > 0.0,
            "Core radius must be positive"
        );
        anyhow::ensure!(
            self.territory.core_radius < self.territory.outer_radius,
            "Core radius must be below outer radius"
        );
        anyhow::ensure!(
            self.territory.boundary_fraction > 0.0 && self.territory.boundary_fraction <= 1.0,
            "Boundary fraction must be in (0.0, 1.0]"
        );
        anyhow::ensure!(
            self.territory.scent_interval > 0,
            "Scent interval must be positive"
        );

        // Siege
        anyhow::ensure!(
            self.siege.commander_min_standoff < self.siege.commander_max_standoff,
            "Commander standoff band is empty"
        );
        anyhow::ensure!(
            self.siege.settlement_radius > 0.0,
            "Settlement radius must be positive"
        );
        anyhow::ensure!(
            self.siege.perimeter_band > 0.0 && self.siege.perimeter_band <= 1.0,
            "Perimeter band must be in (0.0, 1.0]"
        );

        // Scheduler
        anyhow::ensure!(
            self.scheduler.check_interval > 0,
            "Siege check interval must be positive"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.scheduler.base_chance)
                && (0.0..=1.0).contains(&self.scheduler.blizzard_chance),
            "Siege chances must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.scheduler.retreat_casualty_fraction > 0.0
                && self.scheduler.retreat_casualty_fraction <= 1.0,
            "Retreat casualty fraction must be in (0.0, 1.0]"
        );

        Ok(())
    }

    /// Parses and validates a TOML document. Missing sections keep their defaults.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Digest of the behavior sections, used to tag saves and run summaries.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.hierarchy).as_bytes());
        hasher.update(format!("{:?}", self.hunting).as_bytes());
        hasher.update(format!("{:?}", self.territory).as_bytes());
        hasher.update(format!("{:?}", self.siege).as_bytes());
        hasher.update(format!("{:?}", self.scheduler).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_core_radius_must_be_below_outer() {
        let config = AppConfig {
            territory: TerritoryConfig {
                core_radius: 64.0,
                outer_radius: 64.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_player_in_prey_list_rejected() {
        let config = AppConfig {
            hunting: HuntingConfig {
                prey_species: vec![Species::Sheep, Species::Player],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_jitter() {
        let config = AppConfig {
            hierarchy: HierarchyConfig {
                strength_jitter: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [hunting]
            hunt_energy_cost = 25.0

            [territory]
            outer_radius = 80.0
            "#,
        )
        .unwrap();
        assert_eq!(config.hunting.hunt_energy_cost, 25.0);
        assert_eq!(config.hunting.satiation_threshold, 80.0);
        assert_eq!(config.territory.outer_radius, 80.0);
        assert_eq!(config.territory.core_radius, 32.0);
    }

    #[test]
    fn test_toml_validation_runs() {
        let result = AppConfig::from_toml(
            r#"
            [territory]
            outer_radius = 10.0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_fingerprint_tracks_behavior_sections() {
        let a = AppConfig::default();
        let mut b = AppConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.hunting.rest_ticks += 1;
        assert_ne!(a.fingerprint(), b.fingerprint());
        let mut c = AppConfig::default();
        c.world.seed = Some(7);
        assert_eq!(a.fingerprint(), c.fingerprint());
    }
}
