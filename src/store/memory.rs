use std::sync::Mutex;

use super::RecordStore;
use crate::error::Result;
use crate::model::Record;

/// In-memory record store for testing command logic without filesystem I/O.
///
/// A `Mutex` stands in for the production file lock: `update` holds it for
/// the whole read-modify-write, matching the `JsonlStore` critical-section
/// contract.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<Record>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryStore {
    fn load_all(&self) -> Result<Vec<Record>> {
        Ok(self.records.lock().expect("record store poisoned").clone())
    }

    fn write_all(&self, records: &[Record]) -> Result<()> {
        *self.records.lock().expect("record store poisoned") = records.to_vec();
        Ok(())
    }

    fn append(&self, record: &Record) -> Result<()> {
        self.records
            .lock()
            .expect("record store poisoned")
            .push(record.clone());
        Ok(())
    }

    fn update<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Record>) -> T,
    {
        let mut records = self.records.lock().expect("record store poisoned");
        Ok(apply(&mut records))
    }
}
