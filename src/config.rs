//! # Configuration
//!
//! Loaded with [`confique`]: a TOML file (when given) with environment
//! variables layered on top and compiled defaults underneath.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | platform data dir, else `/var/data` | Where the record store file lives |
//! | `uploads_dir` | `<data_dir>/uploads` | Root of the per-entity upload folders |
//! | `max_upload_bytes` | 120 MiB | Largest accepted single upload |
//! | `allowed_extensions` | built-in set | Upload extension allow-list override |
//! | `uploads_base_url` | `/uploads` | Public base path attachments are served under |
//! | `lock_timeout_ms` | `5000` | Bounded wait for the store lock |
//!
//! Environment overrides: `CARDSTOCK_DATA_DIR`, `CARDSTOCK_UPLOADS_DIR`,
//! `CARDSTOCK_MAX_UPLOAD_BYTES`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sanitize::DEFAULT_ALLOWED_EXTENSIONS;

/// Fallback when no data dir is configured and the platform offers none.
pub const DEFAULT_DATA_DIR: &str = "/var/data";

const DEFAULT_MAX_UPLOAD_BYTES: u64 = 120 * 1024 * 1024;

/// Configuration for cardstock, stored in `cardstock.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CardstockConfig {
    /// Directory holding the record store file.
    #[config(env = "CARDSTOCK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Root directory for uploaded files. When absent, `uploads/` under the
    /// data directory.
    #[config(env = "CARDSTOCK_UPLOADS_DIR")]
    pub uploads_dir: Option<PathBuf>,

    /// Largest accepted size for a single uploaded file, in bytes.
    #[config(default = 125829120, env = "CARDSTOCK_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: u64,

    /// Extension allow-list override. When absent, the built-in set of
    /// common image, video and document types.
    pub allowed_extensions: Option<Vec<String>>,

    /// Public base path that attachment URLs are derived from.
    #[config(default = "/uploads")]
    pub uploads_base_url: String,

    /// How long a store operation waits for the file lock before giving up.
    #[config(default = 5000)]
    pub lock_timeout_ms: u64,
}

impl Default for CardstockConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            uploads_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: None,
            uploads_base_url: "/uploads".to_string(),
            lock_timeout_ms: 5000,
        }
    }
}

impl CardstockConfig {
    /// Load from an optional TOML file with env overrides on top.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }

    /// Resolved data directory: configured value, platform data dir, or the
    /// compiled fallback.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        ProjectDirs::from("", "", "cardstock")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// Resolved uploads directory, defaulting to `uploads/` under the data
    /// directory.
    pub fn uploads_dir(&self) -> PathBuf {
        self.uploads_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("uploads"))
    }

    /// The effective extension allow-list, entries lowercased and with any
    /// leading dot stripped.
    pub fn allowed_extensions(&self) -> HashSet<String> {
        match &self.allowed_extensions {
            Some(list) => list
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}
