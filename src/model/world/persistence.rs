use crate::model::world::{Identity, WolfMind, World};
use std::path::Path;
use wolfpack_data::RecordBook;

impl World {
    /// Every wolf's attached record as of this tick.
    pub fn record_book(&self) -> RecordBook {
        let mut book = RecordBook::new(self.tick);
        for (_, (identity, mind)) in self.ecs.query::<(&Identity, &WolfMind)>().iter() {
            book.insert(identity.id, mind.record);
        }
        book
    }

    /// Re-attaches saved records to the wolves with matching ids. Ranks come
    /// back as a cache only and are re-evaluated at the next window.
    /// Returns how many wolves were matched.
    pub fn restore_records(&mut self, book: &RecordBook) -> usize {
        let mut matched = 0;
        for (_, (identity, mind)) in self.ecs.query_mut::<(&Identity, &mut WolfMind)>() {
            let Some(record) = book.get(&identity.id) else {
                continue;
            };
            mind.record = *record;
            mind.hierarchy.tracker_mut().restore(record.rank, record.alpha_id);
            if let Some(center) = record.territory_center {
                mind.territory.recenter(center);
            }
            matched += 1;
        }
        self.orders = Default::default();
        tracing::info!(records = book.len(), matched, "Restored pack records");
        matched
    }

    pub fn save_records<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<String> {
        let digest = wolfpack_io::save_records(&self.record_book(), path)?;
        Ok(digest)
    }

    pub fn load_records<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<usize> {
        let book = wolfpack_io::load_records(path)?;
        Ok(self.restore_records(&book))
    }
}
