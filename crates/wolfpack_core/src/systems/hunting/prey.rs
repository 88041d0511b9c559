//! Prey eligibility: local validity filters and the population-health gate.

use crate::collaborators::{NeighborQuery, PopulationHealth};
use crate::error::Result;
use wolfpack_data::{EntitySnapshot, Species};

/// Local filters every candidate must pass, independent of the selector.
pub fn is_valid_prey(hunter: &EntitySnapshot, candidate: &EntitySnapshot, allowed: &[Species]) -> bool {
    if !candidate.alive || candidate.id == hunter.id || candidate.tamed {
        return false;
    }
    if candidate.species == Species::Player {
        return false;
    }
    if candidate.species == hunter.species && candidate.pack_id.is_some() && candidate.pack_id == hunter.pack_id {
        return false;
    }
    allowed.contains(&candidate.species)
}

/// Asks the population gate about `candidate`. A failing gate rejects the
/// candidate: without an answer the prey cannot be shown to be sustainable.
pub fn passes_population_check(
    population: &dyn PopulationHealth,
    hunter: &EntitySnapshot,
    candidate: &EntitySnapshot,
    failures: &mut u64,
) -> bool {
    match population.is_healthy(hunter, candidate) {
        Ok(healthy) => {
            if !healthy {
                tracing::debug!(
                    hunter = %hunter.id,
                    prey = %candidate.id,
                    species = ?candidate.species,
                    "Prey population below floor"
                );
            }
            healthy
        }
        Err(err) => {
            *failures += 1;
            tracing::warn!(hunter = %hunter.id, prey = %candidate.id, error = %err, "Population check failed, rejecting prey");
            false
        }
    }
}

/// Density floor: a prey is huntable only while at least `floor` living
/// members of its species (itself included) are within `radius` of it.
pub struct LocalDensityFloor<'a> {
    query: &'a dyn NeighborQuery,
    floor: usize,
    radius: f64,
}

impl<'a> LocalDensityFloor<'a> {
    pub fn new(query: &'a dyn NeighborQuery, floor: usize, radius: f64) -> Self {
        Self { query, floor, radius }
    }
}

impl PopulationHealth for LocalDensityFloor<'_> {
    fn is_healthy(&self, _observer: &EntitySnapshot, candidate: &EntitySnapshot) -> Result<bool> {
        let kin = self
            .query
            .nearby(candidate, self.radius, true)?
            .iter()
            .filter(|e| e.alive && e.species == candidate.species)
            .count();
        Ok(kin + 1 >= self.floor)
    }
}
