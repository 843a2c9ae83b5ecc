//! # API Facade
//!
//! [`CardstockApi`] is the single entry point for the serving layer: a thin
//! facade that dispatches into the command modules and owns no business
//! logic of its own.
//!
//! The facade is generic over the record store (`JsonlStore` in production,
//! `InMemoryStore` in tests) and holds the upload store beside it so that
//! operations spanning both (attaching files, deleting a card together with
//! its upload folder) have one obvious home.
//!
//! What the facade does **not** do: authentication, session handling,
//! request decoding or rendering. The serving layer gates admin capability
//! before calling any mutating method here, and it is expected to run ids
//! and filenames through [`crate::sanitize`] (or [`RecordId::parse`]) before
//! they reach this API.

use std::fs;

use crate::commands::{self, CmdMessage};
use crate::config::CardstockConfig;
use crate::error::Result;
use crate::model::{Card, Page, PageSeed, RecordId};
use crate::store::{JsonlStore, RecordStore};
use crate::uploads::{IncomingFile, UploadReport, UploadStore};

pub struct CardstockApi<S: RecordStore> {
    store: S,
    uploads: UploadStore,
}

impl CardstockApi<JsonlStore> {
    /// Wire up the production store from configuration, creating the data
    /// and uploads directories if they are missing.
    pub fn open(config: &CardstockConfig) -> Result<Self> {
        let data_dir = config.data_dir();
        let uploads_dir = config.uploads_dir();
        fs::create_dir_all(&data_dir)?;
        fs::create_dir_all(&uploads_dir)?;
        tracing::info!(data_dir = %data_dir.display(), uploads_dir = %uploads_dir.display(), "opening record store");

        let store = JsonlStore::new(&data_dir).with_lock_timeout(config.lock_timeout());
        let uploads = UploadStore::new(
            uploads_dir,
            config.allowed_extensions(),
            config.max_upload_bytes,
            config.uploads_base_url.clone(),
        );
        Ok(Self::new(store, uploads))
    }
}

impl<S: RecordStore> CardstockApi<S> {
    pub fn new(store: S, uploads: UploadStore) -> Self {
        Self { store, uploads }
    }

    /// Seed the fixed pages; safe to call on every startup.
    pub fn seed_pages(&self, seeds: &[PageSeed]) -> Result<Vec<CmdMessage>> {
        commands::seed::run(&self.store, seeds)
    }

    pub fn get_page(&self, slug: &str) -> Result<Option<Page>> {
        commands::pages::get(&self.store, slug, self.uploads.base_url())
    }

    pub fn list_pages(&self) -> Result<Vec<Page>> {
        commands::pages::list(&self.store, self.uploads.base_url())
    }

    pub fn upsert_page(&self, slug: &str, page: Page) -> Result<()> {
        commands::pages::upsert(&self.store, slug, page)
    }

    pub fn get_card(&self, id: &RecordId) -> Result<Option<Card>> {
        commands::cards::get(&self.store, id, self.uploads.base_url())
    }

    /// Cards sorted most-recently-modified first.
    pub fn list_cards(&self) -> Result<Vec<Card>> {
        commands::cards::list(&self.store, self.uploads.base_url())
    }

    pub fn upsert_card(&self, id: &RecordId, card: Card) -> Result<()> {
        commands::cards::upsert(&self.store, id, card)
    }

    /// Delete a card record and its entire upload folder. `Ok(false)` when
    /// no card has this id.
    pub fn delete_card(&self, id: &RecordId) -> Result<bool> {
        let removed = commands::cards::delete(&self.store, id)?;
        if removed {
            self.uploads.remove_entity_dir(id);
        }
        Ok(removed)
    }

    /// Persist a batch of uploads under the entity's folder without touching
    /// the record store. Most callers want [`attach_files`] instead.
    ///
    /// [`attach_files`]: Self::attach_files
    pub fn save_uploaded_files(
        &self,
        id: &RecordId,
        incoming: &[IncomingFile],
    ) -> Result<UploadReport> {
        self.uploads.save_files(id, incoming)
    }

    /// Save a batch of uploads and append them to the owning entity's
    /// `files` list in one step.
    pub fn attach_files(&self, id: &RecordId, incoming: &[IncomingFile]) -> Result<UploadReport> {
        commands::files::attach(&self.store, &self.uploads, id, incoming)
    }

    /// Remove one attachment by name from its owning entity, best-effort on
    /// the physical file. `Ok(false)` when the name was not attached.
    pub fn delete_file(&self, id: &RecordId, filename: &str) -> Result<bool> {
        commands::files::delete_file(&self.store, &self.uploads, id, filename)
    }

    /// Remove the entity's whole upload folder, tolerating absence.
    pub fn delete_entity_files(&self, id: &RecordId) {
        self.uploads.remove_entity_dir(id)
    }

    /// Resolve the on-disk path of an uploaded file for the serving layer.
    /// The name is sanitized first; `None` if the file does not exist.
    pub fn upload_path(&self, id: &RecordId, raw_name: &str) -> Option<std::path::PathBuf> {
        let name = crate::sanitize::sanitize_filename(raw_name)?;
        let path = self.uploads.file_path(id, &name);
        path.exists().then_some(path)
    }
}
