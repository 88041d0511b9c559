use crate::config::HierarchyConfig;
use crate::context::PackStanding;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;
use wolfpack_data::{AgentId, EntitySnapshot, PackId, Rank};

/// `health ratio * age factor + jitter`.
pub fn strength_score(agent: &EntitySnapshot, jitter: f64, config: &HierarchyConfig) -> f64 {
    let age_factor = if agent.juvenile {
        config.juvenile_age_factor
    } else {
        1.0
    };
    agent.health_ratio() * age_factor + jitter
}

/// Tie-breaking term for one member in one evaluation window.
///
/// Seeded from the pack, the window and the member, so every packmate that
/// evaluates in the same window draws the same value for the same member,
/// and the draw changes from one window to the next.
pub fn strength_jitter(pack: Option<PackId>, window: u64, member: AgentId, amplitude: f64) -> f64 {
    if amplitude <= 0.0 {
        return 0.0;
    }
    let fold = |v: u128| (v as u64) ^ ((v >> 64) as u64);
    let pack_bits = pack.map(|p| fold(p.as_uuid().as_u128())).unwrap_or(0);
    let seed = pack_bits ^ window.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ fold(member.as_u128());
    ChaCha8Rng::seed_from_u64(seed).gen::<f64>() * amplitude
}

/// Maps a position in the descending strength order to a rank.
pub fn rank_for_index(index: usize, pack_size: usize) -> Rank {
    match index {
        0 => Rank::Alpha,
        1 => Rank::Beta,
        i if (i as f64) < pack_size as f64 * 0.5 => Rank::Mid,
        _ => Rank::Omega,
    }
}

/// Result of one rank evaluation from one agent's point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct RankEvaluation {
    pub rank: Rank,
    pub alpha_id: AgentId,
    /// Members with their strength, strongest first.
    pub ordering: Vec<(AgentId, f64)>,
}

/// Ranks `agent` among itself and `packmates` for evaluation `window`.
///
/// Pure over its inputs: two packmates evaluating the same snapshot in the
/// same window agree on the whole ordering. Exact ties fall back to id order.
pub fn evaluate_rank(
    agent: &EntitySnapshot,
    packmates: &[EntitySnapshot],
    window: u64,
    config: &HierarchyConfig,
) -> RankEvaluation {
    let pack = agent.pack_id;
    let mut ordering: Vec<(AgentId, f64)> = std::iter::once(agent)
        .chain(packmates.iter().filter(|m| agent.is_packmate_of(m)))
        .map(|m| {
            let jitter = strength_jitter(pack, window, m.id, config.strength_jitter);
            (m.id, strength_score(m, jitter, config))
        })
        .collect();

    ordering.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(&b.0),
        other => other,
    });

    let index = ordering
        .iter()
        .position(|(id, _)| *id == agent.id)
        .unwrap_or(0);
    let alpha_id = ordering.first().map(|(id, _)| *id).unwrap_or(agent.id);

    RankEvaluation {
        rank: rank_for_index(index, ordering.len()),
        alpha_id,
        ordering,
    }
}

/// Per-agent rank cache, refreshed once per evaluation window.
#[derive(Debug, Clone)]
pub struct HierarchyTracker {
    config: HierarchyConfig,
    rank: Rank,
    alpha_id: Option<AgentId>,
    last_window: Option<u64>,
}

impl HierarchyTracker {
    pub fn new(config: HierarchyConfig) -> Self {
        Self {
            config,
            rank: Rank::Unknown,
            alpha_id: None,
            last_window: None,
        }
    }

    /// Seeds the cache from a persisted record; it is still re-evaluated at
    /// the next window.
    pub fn restore(&mut self, rank: Rank, alpha_id: Option<AgentId>) {
        self.rank = rank;
        self.alpha_id = alpha_id;
    }

    #[inline]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    #[inline]
    pub fn alpha_id(&self) -> Option<AgentId> {
        self.alpha_id
    }

    pub fn window(&self, tick: u64) -> u64 {
        tick / self.config.eval_interval.max(1)
    }

    pub fn is_due(&self, tick: u64) -> bool {
        self.last_window != Some(self.window(tick))
    }

    /// Re-evaluates if a new window has started and returns the standing
    /// every engine should use this tick.
    pub fn refresh(&mut self, tick: u64, agent: &EntitySnapshot, neighbors: &[EntitySnapshot]) -> PackStanding {
        if self.is_due(tick) {
            let window = self.window(tick);
            let evaluation = evaluate_rank(agent, neighbors, window, &self.config);
            if evaluation.rank != self.rank {
                tracing::debug!(
                    agent = %agent.id,
                    from = ?self.rank,
                    to = ?evaluation.rank,
                    pack_size = evaluation.ordering.len(),
                    "Rank changed"
                );
            }
            self.rank = evaluation.rank;
            self.alpha_id = Some(evaluation.alpha_id);
            self.last_window = Some(window);
        }
        PackStanding {
            pack_id: agent.pack_id,
            rank: self.rank,
            alpha_id: self.alpha_id,
        }
    }
}
