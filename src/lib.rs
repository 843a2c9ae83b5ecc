//! # Cardstock
//!
//! A small flat-file content backend: a handful of pre-seeded pages, admin
//! created cards, and their file attachments, persisted as line-delimited
//! JSON under an advisory file lock. Cardstock is the storage core only;
//! HTTP routing, templating, sessions and authentication live in whatever
//! serves it.
//!
//! ## Layers
//!
//! ```text
//! serving layer (HTTP, auth, forms; not this crate)
//!         │
//!         ▼
//! api.rs        CardstockApi: thin facade, the collaborator surface
//!         │
//!         ▼
//! commands/     pages, cards, files, seed: the repository logic
//!         │
//!         ▼
//! store/        RecordStore trait; JsonlStore (file + lock), InMemoryStore
//! uploads.rs    per-entity upload folders beside the store
//! ```
//!
//! `sanitize` and `model` underpin everything: ids and filenames are
//! validated before they touch a path or a lookup, and the two record kinds
//! are a tagged sum type decoded line by line.
//!
//! ## Consistency model
//!
//! The store file is the unit of consistency: updates rewrite the whole
//! file under a cross-process advisory lock, and compound mutations run
//! read-modify-write inside a single lock acquisition. Uploaded bytes are
//! deliberately outside that lock; the record list is authoritative and
//! filesystem cleanup is best-effort.

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod sanitize;
pub mod store;
pub mod uploads;

pub use api::CardstockApi;
pub use commands::{CmdMessage, MessageLevel};
pub use config::CardstockConfig;
pub use error::{CardstockError, Result};
pub use model::{Card, FileAttachment, Page, PageSeed, Record, RecordId, Section};
pub use store::{InMemoryStore, JsonlStore, RecordStore};
pub use uploads::{IncomingFile, UploadReport, UploadStore};
