pub mod cohesion;
pub mod pack;
pub mod rank;

pub use cohesion::HierarchyBehavior;
pub use pack::{get_or_assign_pack_id, join_pack, mint_pack_id};
pub use rank::{evaluate_rank, rank_for_index, strength_score, HierarchyTracker, RankEvaluation};
