//! Attachment orchestration: the operations that span both the record store
//! and the upload folder.
//!
//! The record list is the authoritative state. `attach` therefore appends to
//! the entity's `files` list (never replaces it) in the same critical
//! section that touches `updated_at`, and `delete_file` commits the
//! record-list removal before attempting the best-effort physical delete.

use crate::error::{CardstockError, Result};
use crate::model::RecordId;
use crate::sanitize;
use crate::store::RecordStore;
use crate::uploads::{IncomingFile, UploadReport, UploadStore};

/// Save a batch of uploads and append the results to the owning entity's
/// `files` list.
///
/// The saved attachments are appended to whatever the list already holds;
/// rejected batch members surface as notices in the report. If no entity has
/// this id the saved bytes are rolled back and `EntityNotFound` is returned.
pub fn attach<S: RecordStore>(
    store: &S,
    uploads: &UploadStore,
    id: &RecordId,
    incoming: &[IncomingFile],
) -> Result<UploadReport> {
    let report = uploads.save_files(id, incoming)?;

    let appended = report.saved.clone();
    let target = id.clone();
    let found = store.update(move |records| {
        let Some(record) = records.iter_mut().find(|r| *r.id() == target) else {
            return false;
        };
        record.files_mut().extend(appended);
        record.touch();
        true
    })?;

    if !found {
        for attachment in &report.saved {
            uploads.remove_file(id, &attachment.name);
        }
        return Err(CardstockError::EntityNotFound(id.clone()));
    }

    Ok(report)
}

/// Remove one attachment from its owning entity, by exact sanitized name.
///
/// Returns `Ok(false)` when the name does not sanitize, the entity does not
/// exist, or the name is not in its list: a no-op, not an error. On
/// success the record rewrite commits first; removing the physical file is
/// best-effort.
pub fn delete_file<S: RecordStore>(
    store: &S,
    uploads: &UploadStore,
    id: &RecordId,
    raw_name: &str,
) -> Result<bool> {
    let Some(name) = sanitize::sanitize_filename(raw_name) else {
        return Ok(false);
    };

    let target = id.clone();
    let name_in_list = name.clone();
    let removed = store.update(move |records| {
        let Some(record) = records.iter_mut().find(|r| *r.id() == target) else {
            return false;
        };
        let files = record.files_mut();
        let before = files.len();
        files.retain(|f| f.name != name_in_list);
        if files.len() == before {
            return false;
        }
        record.touch();
        true
    })?;

    if removed {
        uploads.remove_file(id, &name);
    }
    Ok(removed)
}
