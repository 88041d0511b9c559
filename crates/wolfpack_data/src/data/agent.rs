use super::vector::Vec3;
use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of an agent, owned by the host.
pub type AgentId = Uuid;

/// Stable identifier shared by every member of a pack.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
#[archive_attr(derive(Debug, PartialEq, Eq, Hash))]
pub struct PackId(pub Uuid);

impl PackId {
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pack-{}", self.0)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
/// Kinds of entity the engine knows how to reason about.
pub enum Species {
    Wolf,
    Sheep,
    Rabbit,
    Fox,
    Cow,
    Pig,
    Chicken,
    Villager,
    IronGolem,
    Player,
}

impl Species {
    /// Farm animals kept by a settlement.
    #[must_use]
    pub fn is_livestock(self) -> bool {
        matches!(
            self,
            Species::Cow | Species::Pig | Species::Chicken | Species::Sheep
        )
    }

    /// Siege classification; `None` for things a siege never targets.
    #[must_use]
    pub fn target_class(self, juvenile: bool) -> Option<TargetClass> {
        match self {
            s if s.is_livestock() => Some(TargetClass::Livestock),
            Species::Villager if juvenile => Some(TargetClass::ChildVillager),
            Species::Villager => Some(TargetClass::AdultVillager),
            Species::IronGolem => Some(TargetClass::Guardian),
            _ => None,
        }
    }
}

/// Classes of siege target, from primary resource down to armed defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetClass {
    Livestock,
    ChildVillager,
    AdultVillager,
    Guardian,
}

/// Read-only view of an entity for one tick.
///
/// The host produces these; the engine never holds on to them across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: AgentId,
    pub species: Species,
    pub position: Vec3,
    pub velocity: Vec3,
    pub health: f64,
    pub max_health: f64,
    pub juvenile: bool,
    pub alive: bool,
    pub tamed: bool,
    pub pack_id: Option<PackId>,
}

impl EntitySnapshot {
    /// A healthy adult at `position` with no pack.
    #[must_use]
    pub fn new(id: AgentId, species: Species, position: Vec3) -> Self {
        Self {
            id,
            species,
            position,
            velocity: Vec3::ZERO,
            health: 20.0,
            max_health: 20.0,
            juvenile: false,
            alive: true,
            tamed: false,
            pack_id: None,
        }
    }

    #[must_use]
    pub fn health_ratio(&self) -> f64 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    #[must_use]
    pub fn distance_to(&self, other: &EntitySnapshot) -> f64 {
        self.position.distance_to(other.position)
    }

    /// Packmates share species and a pack id; tamed or dead agents never count.
    #[must_use]
    pub fn is_packmate_of(&self, other: &EntitySnapshot) -> bool {
        self.id != other.id
            && other.alive
            && !other.tamed
            && self.species == other.species
            && self.pack_id.is_some()
            && self.pack_id == other.pack_id
    }
}
