use rand::Rng;
use wolfpack_data::{PackId, PackRecord, Rank, Vec3};

/// Fresh pack id with a v4 layout, drawn from the engine RNG so seeded runs
/// mint the same ids.
pub fn mint_pack_id<R: Rng + ?Sized>(rng: &mut R) -> PackId {
    let bytes: [u8; 16] = rng.gen();
    PackId(uuid::Builder::from_random_bytes(bytes).into_uuid())
}

/// Returns the record's pack id, minting and storing one on first use.
pub fn get_or_assign_pack_id<R: Rng + ?Sized>(record: &mut PackRecord, rng: &mut R) -> PackId {
    if let Some(id) = record.pack_id {
        return id;
    }
    let id = mint_pack_id(rng);
    record.pack_id = Some(id);
    tracing::debug!(pack = %id, "Formed new pack");
    id
}

/// Moves an agent into `pack`. Rank is dropped until the next evaluation;
/// a territory center is inherited only if the agent has none yet.
pub fn join_pack(record: &mut PackRecord, pack: PackId, territory_center: Option<Vec3>) {
    if record.pack_id != Some(pack) {
        record.pack_id = Some(pack);
        record.rank = Rank::Unknown;
        record.alpha_id = None;
    }
    if record.territory_center.is_none() {
        record.territory_center = territory_center;
    }
}
