//! # Upload Manager
//!
//! Uploaded bytes live outside the record store, one folder per entity:
//! `<uploads-dir>/<entity-id>/<filename>`. The folder is created on the
//! first save and removed wholesale when the entity is deleted.
//!
//! Saving is deliberately forgiving: within a batch, a file whose name
//! cannot be sanitized is skipped silently, and a file failing the extension
//! or size gate produces a per-file notice while the rest of the batch
//! continues. Physical deletions are best-effort: the record list is the
//! authoritative state, so a file that refuses to disappear is logged and
//! tolerated.
//!
//! Uploaded-byte writes are not covered by the store lock; they are
//! independent per-file operations, safe to interleave because names are
//! made collision-free against the live folder at write time.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::CmdMessage;
use crate::error::Result;
use crate::model::{FileAttachment, RecordId};
use crate::sanitize;

/// An uploaded payload as handed over by the form-decoding layer.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(original_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            bytes,
        }
    }
}

/// Outcome of a batch save: what made it to disk, plus one notice per
/// rejected file.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub saved: Vec<FileAttachment>,
    pub messages: Vec<CmdMessage>,
}

/// Filesystem half of the upload manager.
pub struct UploadStore {
    root: PathBuf,
    allowed_extensions: HashSet<String>,
    max_file_bytes: u64,
    base_url: String,
}

impl UploadStore {
    pub fn new(
        root: PathBuf,
        allowed_extensions: HashSet<String>,
        max_file_bytes: u64,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            root,
            allowed_extensions,
            max_file_bytes,
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn entity_dir(&self, id: &RecordId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// On-disk path for a (sanitized) filename under the entity's folder.
    pub fn file_path(&self, id: &RecordId, name: &str) -> PathBuf {
        self.entity_dir(id).join(name)
    }

    /// Persist a batch of uploads under the entity's folder.
    ///
    /// Per file: an empty original name or a name that sanitizes to nothing
    /// is skipped; a disallowed extension or an oversize payload yields a
    /// warning notice and the batch continues; everything else is written
    /// under a collision-free name and reported as a saved attachment.
    pub fn save_files(&self, id: &RecordId, incoming: &[IncomingFile]) -> Result<UploadReport> {
        let mut report = UploadReport::default();
        if incoming.is_empty() {
            return Ok(report);
        }

        let folder = self.entity_dir(id);
        fs::create_dir_all(&folder)?;

        for file in incoming {
            let original = file.original_name.as_str();
            if original.is_empty() {
                continue;
            }
            let Some(name) = sanitize::sanitize_filename(original) else {
                continue;
            };
            if !sanitize::is_allowed_extension(&name, &self.allowed_extensions) {
                report.messages.push(CmdMessage::warning(format!(
                    "File \"{original}\" rejected: unsupported extension."
                )));
                continue;
            }
            if file.bytes.len() as u64 > self.max_file_bytes {
                report.messages.push(CmdMessage::warning(format!(
                    "File \"{original}\" rejected: larger than the {} byte upload limit.",
                    self.max_file_bytes
                )));
                continue;
            }

            let name = sanitize::unique_name(&folder, &name);
            fs::write(folder.join(&name), &file.bytes)?;
            tracing::debug!(entity = %id, file = %name, bytes = file.bytes.len(), "saved upload");

            report
                .saved
                .push(FileAttachment::for_entity(name, id, &self.base_url));
        }

        Ok(report)
    }

    /// Best-effort removal of a single file. Returns whether a file was
    /// actually deleted; failures are logged and swallowed since the record
    /// list, not the filesystem, is authoritative.
    pub fn remove_file(&self, id: &RecordId, name: &str) -> bool {
        let path = self.file_path(id, name);
        if !path.exists() {
            return false;
        }
        match fs::remove_file(&path) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to remove uploaded file");
                false
            }
        }
    }

    /// Best-effort recursive removal of the entity's whole upload folder.
    /// A folder that does not exist, or refuses to go, is tolerated.
    pub fn remove_entity_dir(&self, id: &RecordId) {
        let dir = self.entity_dir(id);
        if !dir.exists() {
            return;
        }
        if let Err(err) = fs::remove_dir_all(&dir) {
            tracing::warn!(path = %dir.display(), %err, "failed to remove upload folder");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::DEFAULT_ALLOWED_EXTENSIONS;
    use tempfile::tempdir;

    fn test_store(root: &std::path::Path) -> UploadStore {
        let allowed = DEFAULT_ALLOWED_EXTENSIONS
            .iter()
            .map(|e| e.to_string())
            .collect();
        UploadStore::new(root.to_path_buf(), allowed, 1024, "/uploads")
    }

    fn entity() -> RecordId {
        RecordId::parse("a1b2c3d4e5").unwrap()
    }

    #[test]
    fn saves_bytes_under_the_entity_folder() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path());
        let id = entity();

        let report = store
            .save_files(&id, &[IncomingFile::new("report.pdf", b"data".to_vec())])
            .unwrap();

        assert_eq!(report.saved.len(), 1);
        assert!(report.messages.is_empty());
        let saved = &report.saved[0];
        assert_eq!(saved.name, "report.pdf");
        assert_eq!(saved.ext, "pdf");
        assert_eq!(saved.url, "/uploads/a1b2c3d4e5/report.pdf");
        assert_eq!(
            std::fs::read(store.file_path(&id, "report.pdf")).unwrap(),
            b"data"
        );
    }

    #[test]
    fn batch_continues_past_rejected_files() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path());
        let id = entity();

        let report = store
            .save_files(
                &id,
                &[
                    IncomingFile::new("good.png", b"a".to_vec()),
                    IncomingFile::new("bad.exe", b"b".to_vec()),
                    IncomingFile::new("also_good.pdf", b"c".to_vec()),
                ],
            )
            .unwrap();

        assert_eq!(report.saved.len(), 2);
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].content.contains("bad.exe"));
        assert!(!store.file_path(&id, "bad.exe").exists());
    }

    #[test]
    fn oversize_file_is_rejected_with_a_notice() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path());
        let id = entity();

        let report = store
            .save_files(
                &id,
                &[
                    IncomingFile::new("big.png", vec![0; 2048]),
                    IncomingFile::new("small.png", vec![0; 16]),
                ],
            )
            .unwrap();

        assert_eq!(report.saved.len(), 1);
        assert_eq!(report.saved[0].name, "small.png");
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].content.contains("big.png"));
    }

    #[test]
    fn unsanitizable_and_empty_names_are_skipped_silently() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path());

        let report = store
            .save_files(
                &entity(),
                &[
                    IncomingFile::new("", b"x".to_vec()),
                    IncomingFile::new("....", b"x".to_vec()),
                ],
            )
            .unwrap();

        assert!(report.saved.is_empty());
        assert!(report.messages.is_empty());
    }

    #[test]
    fn colliding_names_get_numeric_suffixes() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path());
        let id = entity();

        for expected in ["a.png", "a_2.png", "a_3.png"] {
            let report = store
                .save_files(&id, &[IncomingFile::new("a.png", b"x".to_vec())])
                .unwrap();
            assert_eq!(report.saved[0].name, expected);
        }
    }

    #[test]
    fn remove_file_and_folder_are_tolerant() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path());
        let id = entity();

        store
            .save_files(&id, &[IncomingFile::new("a.png", b"x".to_vec())])
            .unwrap();

        assert!(store.remove_file(&id, "a.png"));
        assert!(!store.remove_file(&id, "a.png")); // already gone

        store.remove_entity_dir(&id);
        assert!(!store.entity_dir(&id).exists());
        store.remove_entity_dir(&id); // absent folder tolerated
    }
}
