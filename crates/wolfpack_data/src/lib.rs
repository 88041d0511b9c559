//! # Wolfpack Data
//!
//! Plain data shared by the pack engine, the persistence layer and the host
//! world: vectors, agent snapshots, ranks, hunting and siege enums, and the
//! per-agent attached record.

pub mod data;

pub use data::agent::{AgentId, EntitySnapshot, PackId, Species, TargetClass};
pub use data::environment::{Climate, Season, SiegeType, Weather};
pub use data::pack::{HuntingState, PackRecord, Rank, RecordBook, SiegeRole};
pub use data::vector::Vec3;
