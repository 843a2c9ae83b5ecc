use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs4::fs_std::FileExt;

use super::RecordStore;
use crate::error::{CardstockError, Result};
use crate::model::Record;

/// Historic name kept for compatibility with existing deployments; the
/// content is newline-delimited JSON, not CSV.
pub const STORE_FILE_NAME: &str = "submissions.csv";

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Production record store: one JSON object per line in a single file,
/// guarded by an advisory lock on a `.lock` sibling.
pub struct JsonlStore {
    path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
}

impl JsonlStore {
    /// Store rooted in `data_dir`; the file itself is created lazily on the
    /// first write.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join(STORE_FILE_NAME);
        let lock_path = path.with_extension("csv.lock");
        Self {
            path,
            lock_path,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<StoreLock> {
        StoreLock::acquire(&self.lock_path, self.lock_timeout)
    }

    // Callers must hold the store lock.
    fn read_records(&self) -> Result<Vec<Record>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Record>(trimmed) {
                Ok(record) => records.push(record),
                Err(err) => {
                    // One bad line never aborts the read.
                    tracing::warn!(path = %self.path.display(), %err, "skipping corrupt store line");
                }
            }
        }
        Ok(records)
    }

    // Callers must hold the store lock. Writes to a sibling temp file and
    // renames it over the store so readers never observe a half-written file.
    fn write_records(&self, records: &[Record]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("csv.tmp");
        let mut tmp = File::create(&tmp_path)?;
        for record in records {
            let line = serde_json::to_string(record)?;
            tmp.write_all(line.as_bytes())?;
            tmp.write_all(b"\n")?;
        }
        tmp.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl RecordStore for JsonlStore {
    fn load_all(&self) -> Result<Vec<Record>> {
        let _guard = self.lock()?;
        self.read_records()
    }

    fn write_all(&self, records: &[Record]) -> Result<()> {
        let _guard = self.lock()?;
        self.write_records(records)
    }

    fn append(&self, record: &Record) -> Result<()> {
        let _guard = self.lock()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(record)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }

    fn update<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Record>) -> T,
    {
        let _guard = self.lock()?;
        let mut records = self.read_records()?;
        let out = apply(&mut records);
        self.write_records(&records)?;
        Ok(out)
    }
}

/// Exclusive advisory lock on the store, released on drop.
struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Acquire with a bounded wait: poll `try_lock_exclusive` until the
    /// deadline, then fail with [`CardstockError::LockTimeout`] rather than
    /// hang.
    fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;

        let deadline = Instant::now() + timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Self { file }),
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Err(CardstockError::LockTimeout {
                            path: path.to_path_buf(),
                            waited_ms: timeout.as_millis() as u64,
                        });
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Card, RecordId};
    use tempfile::tempdir;

    fn card(id: &str, title: &str) -> Record {
        Record::Card(Card::new(RecordId::parse(id).unwrap(), title))
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let store = JsonlStore::new(dir.path());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn append_then_load_preserves_order() {
        let dir = tempdir().unwrap();
        let store = JsonlStore::new(dir.path());

        store.append(&card("aaaa1111", "first")).unwrap();
        store.append(&card("bbbb2222", "second")).unwrap();

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id().as_str(), "aaaa1111");
        assert_eq!(records[1].id().as_str(), "bbbb2222");
    }

    #[test]
    fn write_all_replaces_the_file_in_given_order() {
        let dir = tempdir().unwrap();
        let store = JsonlStore::new(dir.path());

        store.append(&card("aaaa1111", "stale")).unwrap();
        store
            .write_all(&[card("cccc3333", "c"), card("bbbb2222", "b")])
            .unwrap();

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id().as_str(), "cccc3333");
        assert_eq!(records[1].id().as_str(), "bbbb2222");
    }

    #[test]
    fn rewrite_leaves_no_temp_file_behind() {
        let dir = tempdir().unwrap();
        let store = JsonlStore::new(dir.path());
        store.write_all(&[card("aaaa1111", "a")]).unwrap();

        for entry in fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name();
            let name = name.to_string_lossy().into_owned();
            assert!(!name.ends_with(".tmp"), "leftover temp file: {name}");
        }
    }

    #[test]
    fn update_applies_the_closure_result() {
        let dir = tempdir().unwrap();
        let store = JsonlStore::new(dir.path());
        store.append(&card("aaaa1111", "a")).unwrap();

        let len = store
            .update(|records| {
                records.push(card("bbbb2222", "b"));
                records.len()
            })
            .unwrap();

        assert_eq!(len, 2);
        assert_eq!(store.load_all().unwrap().len(), 2);
    }
}
