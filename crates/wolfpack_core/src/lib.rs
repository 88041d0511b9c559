//! # Wolfpack Core
//!
//! Pack behavior engines for wolf-like agents in a host simulation.
//!
//! This crate contains:
//! - Vector and steering primitives shared by every behavior
//! - A grid spatial index for neighbor lookups
//! - Pack identity and the rank hierarchy
//! - Coordinated hunting with a cached pack distance order
//! - Territory defense and patrol
//! - Winter siege roles and the siege scheduler
//! - Metrics collection and structured logging
//!
//! ## Architecture
//!
//! Behaviors never move agents. Each one implements [`SteeringBehavior`] and
//! returns a force for the current tick; the host combines forces with its
//! own weights. Everything a behavior needs from the world arrives through
//! a [`BehaviorContext`] and the [`Services`] collaborators, so the engines
//! stay deterministic for a given context and seed.
//!
//! ## Example
//!
//! ```
//! use wolfpack_core::systems::siege::{role, select_target};
//! use wolfpack_core::config::SiegeConfig;
//! use wolfpack_data::{EntitySnapshot, Rank, SiegeRole, SiegeType, Species, Vec3};
//! use uuid::Uuid;
//!
//! let wolf = EntitySnapshot::new(Uuid::new_v4(), Species::Wolf, Vec3::ZERO);
//! let cow = EntitySnapshot::new(Uuid::new_v4(), Species::Cow, Vec3::flat(10.0, 0.0));
//! let candidates = [cow];
//!
//! assert_eq!(role(Rank::Beta), SiegeRole::Scout);
//! let picked = select_target(&wolf, SiegeRole::Scout, SiegeType::LivestockRaid, &candidates, &SiegeConfig::default());
//! assert_eq!(picked.map(|c| c.id), Some(cow.id));
//! ```

/// Host collaborator traits and fail-open helpers
pub mod collaborators;
/// Configuration for every engine
pub mod config;
/// Per-call behavior context
pub mod context;
/// Engine error type
pub mod error;
/// Performance metrics collection and logging
pub mod metrics;
/// Spatial hashing for neighbor queries
pub mod spatial_hash;
/// Steering primitives and the behavior trait
pub mod steering;
/// Pack engines (hierarchy, hunting, territory, siege)
pub mod systems;

pub use collaborators::{
    NeighborQuery, PopulationHealth, PreySelector, ResourceStore, Signal, SignalKind, SignalSink,
};
pub use context::{BehaviorContext, PackStanding};
pub use error::{EngineError, Result};
pub use metrics::{init_logging, Metrics};
pub use steering::{flee, seek, Services, SteeringBehavior};
pub use systems::hunting::PackHuntingBehavior;
pub use systems::siege::{SiegeScheduler, WolfSiegeBehavior};
pub use systems::social::HierarchyBehavior;
pub use systems::territory::PackTerritoryBehavior;
pub use wolfpack_data::Vec3;
