//! # Record Store
//!
//! The entire database is one line-delimited JSON file: one record per line,
//! UTF-8, no header. The whole file is the unit of consistency: update and
//! delete rewrite every line; there is no partial-row update.
//!
//! [`RecordStore`] is the abstract contract:
//!
//! - `load_all` reads every parseable line, in file order. Malformed lines
//!   are skipped, never fatal; a missing file is an empty store.
//! - `write_all` rewrites the file with the given records in the given order.
//! - `append` adds a single record, the fast path for creation.
//! - `update` runs a read-modify-write closure as one critical section, so a
//!   scan-then-rewrite (upsert, delete, seeding) cannot interleave with
//!   another writer going through this API.
//!
//! ## Implementations
//!
//! - [`jsonl::JsonlStore`]: production store. Every operation holds an
//!   advisory cross-process file lock on a `.lock` sibling of the store
//!   file, acquired with a bounded wait.
//! - [`memory::InMemoryStore`]: for testing command logic without touching
//!   the filesystem.
//!
//! The lock is advisory: it serializes everything going through this API but
//! offers no protection against writers that bypass it.

use crate::error::Result;
use crate::model::Record;

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::InMemoryStore;

/// Abstract interface for the record store.
pub trait RecordStore {
    /// Load every record, in store order. Missing backing file means empty.
    fn load_all(&self) -> Result<Vec<Record>>;

    /// Overwrite the whole store with `records`, preserving their order.
    fn write_all(&self, records: &[Record]) -> Result<()>;

    /// Append one record without rewriting the rest.
    fn append(&self, record: &Record) -> Result<()>;

    /// Run `apply` over the full record list as a single critical section:
    /// the store lock is held from the read through the rewrite, and the
    /// closure's return value is passed back to the caller.
    fn update<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Record>) -> T;
}
