//! Boundary traits the host implements.
//!
//! All of them may fail. The engine absorbs a failure at the call site: it
//! logs a warning, bumps the caller's failure counter and treats the answer
//! as "no information this tick". Nothing is retried.

use crate::context::BehaviorContext;
use crate::error::Result;
use wolfpack_data::{AgentId, EntitySnapshot, PackId, Vec3};

pub const ENERGY_KEY: &str = "energy";
pub const HUNGER_KEY: &str = "hunger";

/// "Entities within radius of an agent", expected sub-linear in world size.
pub trait NeighborQuery {
    /// Never includes `agent` itself.
    fn nearby(
        &self,
        agent: &EntitySnapshot,
        radius: f64,
        same_species_only: bool,
    ) -> Result<Vec<EntitySnapshot>>;
}

/// Per-agent numeric resources under namespaced keys.
pub trait ResourceStore {
    /// `Ok(None)` when the host keeps no record for this agent or key.
    fn read(&self, agent: AgentId, key: &str) -> Result<Option<f64>>;
    fn write(&mut self, agent: AgentId, key: &str, value: f64) -> Result<()>;
}

/// Picks the most desirable prey candidate for an agent.
pub trait PreySelector {
    fn select(&self, ctx: &BehaviorContext<'_>) -> Result<Option<EntitySnapshot>>;
}

/// Sustainability gate consulted for every prey candidate.
pub trait PopulationHealth {
    fn is_healthy(&self, observer: &EntitySnapshot, candidate: &EntitySnapshot) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Intruder inside the core territory.
    AlertHowl,
    /// Alpha keeping the pack together.
    BondingHowl,
    ScentMark,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub source: AgentId,
    pub pack_id: Option<PackId>,
    pub position: Vec3,
    pub tick: u64,
}

/// Fire-and-forget sink for howls and scent marks.
pub trait SignalSink {
    fn emit(&mut self, signal: Signal);
}

impl SignalSink for Vec<Signal> {
    fn emit(&mut self, signal: Signal) {
        self.push(signal);
    }
}

/// Reads a resource, failing open to `fallback` when the host has nothing.
pub fn read_or(
    store: &dyn ResourceStore,
    agent: AgentId,
    key: &str,
    fallback: f64,
    failures: &mut u64,
) -> f64 {
    match store.read(agent, key) {
        Ok(Some(value)) if value.is_finite() => value,
        Ok(_) => fallback,
        Err(err) => {
            *failures += 1;
            tracing::warn!(agent = %agent, key, error = %err, "Resource read failed, assuming fully resourced");
            fallback
        }
    }
}

/// Neighbor list for `agent`, or an empty list if the index failed.
pub fn nearby_or_empty(
    query: &dyn NeighborQuery,
    agent: &EntitySnapshot,
    radius: f64,
    same_species_only: bool,
    failures: &mut u64,
) -> Vec<EntitySnapshot> {
    match query.nearby(agent, radius, same_species_only) {
        Ok(list) => list,
        Err(err) => {
            *failures += 1;
            tracing::warn!(agent = %agent.id, radius, error = %err, "Neighbor query failed, no neighbors this tick");
            Vec::new()
        }
    }
}
