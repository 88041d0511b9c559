//! Record book files. `.json` paths are written as JSON, everything else as
//! a validated rkyv archive.

use crate::error::{IoError, Result};
use crate::serialization::{read_json_file, to_json, write_json_file};
use rkyv::de::deserializers::SharedDeserializeMap;
use rkyv::ser::serializers::AllocSerializer;
use rkyv::ser::Serializer;
use rkyv::{Archive, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use wolfpack_data::RecordBook;

pub fn save_rkyv<T, P>(data: &T, path: P) -> anyhow::Result<()>
where
    T: Serialize<AllocSerializer<4096>>,
    T: Archive,
    P: AsRef<Path>,
{
    let mut serializer = AllocSerializer::<4096>::default();
    serializer
        .serialize_value(data)
        .map_err(|e| anyhow::anyhow!("Rkyv serialization error: {:?}", e))?;
    let bytes = serializer.into_serializer().into_inner();
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

pub fn load_rkyv<T, P>(path: P) -> anyhow::Result<T>
where
    T: Archive,
    T::Archived: Deserialize<T, SharedDeserializeMap>
        + for<'a> rkyv::CheckBytes<rkyv::validation::validators::DefaultValidator<'a>>,
    P: AsRef<Path>,
{
    let bytes = std::fs::read(path)?;
    let archived = rkyv::check_archived_root::<T>(&bytes)
        .map_err(|e| anyhow::anyhow!("Rkyv validation error: {:?}", e))?;
    let mut deserializer = SharedDeserializeMap::default();
    let deserialized: T = archived
        .deserialize(&mut deserializer)
        .map_err(|e| anyhow::anyhow!("Rkyv deserialization error: {:?}", e))?;
    Ok(deserialized)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Rkyv,
}

impl RecordFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Rkyv,
        }
    }
}

/// Hex SHA-256 of the book's canonical JSON, with records in key order.
pub fn record_digest(book: &RecordBook) -> Result<String> {
    let mut ordered: Vec<_> = book.records.iter().collect();
    ordered.sort_by_key(|(id, _)| **id);
    let mut hasher = Sha256::new();
    hasher.update(book.tick.to_le_bytes());
    for (id, record) in ordered {
        hasher.update(id.as_bytes());
        hasher.update(to_json(record)?.as_bytes());
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Rejects books whose records claim evaluations from the future.
fn validate(book: &RecordBook) -> Result<()> {
    if let Some((id, record)) = book.records.iter().find(|(_, r)| r.last_rank_tick > book.tick) {
        return Err(IoError::validation(format!(
            "record {} evaluated at tick {} after book tick {}",
            id, record.last_rank_tick, book.tick
        )));
    }
    Ok(())
}

/// Writes `book` and returns its digest.
pub fn save_records<P: AsRef<Path>>(book: &RecordBook, path: P) -> Result<String> {
    let path = path.as_ref();
    validate(book)?;
    match RecordFormat::for_path(path) {
        RecordFormat::Json => write_json_file(book, path)?,
        RecordFormat::Rkyv => save_rkyv(book, path)
            .map_err(|e| IoError::rkyv(e.to_string()).with_context(format!("writing records to {:?}", path)))?,
    }
    let digest = record_digest(book)?;
    tracing::info!(path = ?path, records = book.len(), tick = book.tick, digest = %digest, "Saved pack records");
    Ok(digest)
}

pub fn load_records<P: AsRef<Path>>(path: P) -> Result<RecordBook> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::not_found(path.display().to_string()));
    }
    let book: RecordBook = match RecordFormat::for_path(path) {
        RecordFormat::Json => read_json_file(path)?,
        RecordFormat::Rkyv => load_rkyv(path)
            .map_err(|e| IoError::rkyv(e.to_string()).with_context(format!("reading records from {:?}", path)))?,
    };
    validate(&book)?;
    tracing::info!(path = ?path, records = book.len(), tick = book.tick, "Loaded pack records");
    Ok(book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use wolfpack_data::{PackId, PackRecord, Rank, Vec3};

    fn book() -> RecordBook {
        let mut book = RecordBook::new(500);
        let pack = PackId(Uuid::new_v4());
        book.insert(
            Uuid::new_v4(),
            PackRecord {
                pack_id: Some(pack),
                territory_center: Some(Vec3::flat(10.0, -4.0)),
                rank: Rank::Alpha,
                alpha_id: None,
                last_rank_tick: 400,
            },
        );
        book
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RecordFormat::for_path(Path::new("packs.json")), RecordFormat::Json);
        assert_eq!(RecordFormat::for_path(Path::new("packs.JSON")), RecordFormat::Json);
        assert_eq!(RecordFormat::for_path(Path::new("packs.bin")), RecordFormat::Rkyv);
        assert_eq!(RecordFormat::for_path(Path::new("packs")), RecordFormat::Rkyv);
    }

    #[test]
    fn test_digest_ignores_map_order() {
        let a = book();
        let mut b = RecordBook::new(a.tick);
        for (id, record) in &a.records {
            b.insert(*id, *record);
        }
        assert_eq!(record_digest(&a).unwrap(), record_digest(&b).unwrap());

        b.tick += 1;
        assert_ne!(record_digest(&a).unwrap(), record_digest(&b).unwrap());
    }

    #[test]
    fn test_future_evaluation_rejected() {
        let mut bad = book();
        bad.tick = 100;
        let path = std::env::temp_dir().join(format!("wolfpack-{}.bin", Uuid::new_v4()));
        assert!(matches!(save_records(&bad, &path), Err(IoError::Validation(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join(format!("wolfpack-{}.bin", Uuid::new_v4()));
        assert!(matches!(load_records(&path), Err(IoError::NotFound(_))));
    }
}
