use super::agent::{AgentId, PackId};
use super::vector::Vec3;
use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
/// Social position inside a pack, derived from the strength ordering.
pub enum Rank {
    Alpha,
    Beta,
    Mid,
    Omega,
    /// Not evaluated yet.
    #[default]
    Unknown,
}

/// Role an agent plays while its pack besieges a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiegeRole {
    Commander,
    Scout,
    Guard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HuntingState {
    #[default]
    Idle,
    Searching,
    Waiting,
    Leading,
    Flanking,
    Attacking,
    Resting,
}

impl HuntingState {
    /// States in which the agent is committed to a prey.
    #[must_use]
    pub fn is_pursuing(self) -> bool {
        matches!(
            self,
            HuntingState::Waiting
                | HuntingState::Leading
                | HuntingState::Flanking
                | HuntingState::Attacking
        )
    }

    /// States that run the hunt clock. `Waiting` holds the prey but does not
    /// spend chase time.
    #[must_use]
    pub fn is_chasing(self) -> bool {
        matches!(
            self,
            HuntingState::Leading | HuntingState::Flanking | HuntingState::Attacking
        )
    }
}

/// Small per-agent record the host persists across save/load.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct PackRecord {
    pub pack_id: Option<PackId>,
    pub territory_center: Option<Vec3>,
    /// Cached only; recomputed at the next evaluation window.
    pub rank: Rank,
    pub alpha_id: Option<AgentId>,
    pub last_rank_tick: u64,
}

/// Every agent's attached record, keyed by agent id.
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct RecordBook {
    pub tick: u64,
    pub records: HashMap<AgentId, PackRecord>,
}

impl RecordBook {
    #[must_use]
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            records: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, id: &AgentId) -> Option<&PackRecord> {
        self.records.get(id)
    }

    pub fn insert(&mut self, id: AgentId, record: PackRecord) {
        self.records.insert(id, record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
