//! # Domain Model: Records, Attachments and Ids
//!
//! The store holds exactly two kinds of record, distinguished on disk by a
//! `kind` tag inside each JSON line:
//!
//! - [`Page`]: one of a small set of pre-seeded content records, addressed
//!   by a human-chosen lowercase `slug`. Pages are seeded once at startup and
//!   only ever edited, never deleted.
//! - [`Card`]: an admin-created record addressed by a generated hex id,
//!   carrying a [`Section`] tag for grouping on listing views.
//!
//! Both kinds embed an ordered list of [`FileAttachment`]s. The attachment
//! `url` is derived state: it is recomputed from the owning entity's id and
//! the persisted file name on every read, so a stored URL from an old host or
//! base path is never trusted.
//!
//! [`RecordId`] is the validated form of an entity id. It can only be built
//! through the sanitizer (or generated fresh), and its `Deserialize` impl
//! validates too: a stored record with a malformed id fails to decode and is
//! skipped by the store's corrupt-line policy.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sanitize;

/// A validated entity id: 8-32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Validate an externally supplied id. Case-folds, then applies the
    /// sanitizer rules; `None` means "treat as not found".
    pub fn parse(raw: &str) -> Option<Self> {
        sanitize::sanitize_id(raw).map(Self)
    }

    /// Generate a fresh id for a new card: a v4 UUID in simple form, which
    /// is 32 lowercase hex characters and therefore always valid.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        RecordId::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid record id: {raw:?}")))
    }
}

/// Category tag attached to a card for grouping on listing views.
///
/// The set is fixed per deployment. Absent or unrecognized tags decode to
/// [`Section::General`], the canonical default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    General,
    Research,
    Media,
    Updates,
}

impl Section {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "research" => Self::Research,
            "media" => Self::Media,
            "updates" => Self::Updates,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Research => "research",
            Self::Media => "media",
            Self::Updates => "updates",
        }
    }
}

// Hand-written so that an unknown tag degrades to the default instead of
// failing the whole line.
impl<'de> Deserialize<'de> for Section {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Section::parse(&raw))
    }
}

/// A file attached to a page or card.
///
/// `name` is the sanitized on-disk filename, unique within the owning
/// entity's upload folder. `ext` and `url` are derived from it on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub name: String,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub url: String,
}

impl FileAttachment {
    /// Build an attachment for `name` under the given entity, deriving `ext`
    /// and `url`. This is the only constructor; it keeps the derived fields
    /// consistent with the name wherever attachments are produced.
    pub fn for_entity(name: String, id: &RecordId, base_url: &str) -> Self {
        Self {
            ext: sanitize::extension_of(&name).unwrap_or_default(),
            url: format!("{}/{}/{}", base_url.trim_end_matches('/'), id, name),
            name,
        }
    }
}

/// Seed data for one fixed page, supplied by the embedding application at
/// startup. Seeds are configuration, not part of the repository contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSeed {
    pub slug: String,
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub link_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub slug: String,
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link_url: String,
    #[serde(default)]
    pub files: Vec<FileAttachment>,
}

impl Page {
    pub fn from_seed(seed: &PageSeed) -> Self {
        let now = Utc::now();
        Self {
            slug: seed.slug.trim().to_lowercase(),
            id: seed.id.clone(),
            created_at: now,
            updated_at: now,
            title: seed.title.clone(),
            description: String::new(),
            link_url: seed.link_url.clone(),
            files: Vec::new(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub(crate) fn refresh_files(&mut self, base_url: &str) {
        self.files = refreshed_files(&self.files, &self.id, base_url);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: RecordId,
    #[serde(default)]
    pub section: Section,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link_url: String,
    #[serde(default)]
    pub files: Vec<FileAttachment>,
}

impl Card {
    pub fn new(id: RecordId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            section: Section::default(),
            created_at: now,
            updated_at: now,
            title: title.into(),
            description: String::new(),
            link_url: String::new(),
            files: Vec::new(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub(crate) fn refresh_files(&mut self, base_url: &str) {
        self.files = refreshed_files(&self.files, &self.id, base_url);
    }
}

/// One line in the record store. The `kind` tag selects the variant; lines
/// with an unknown tag fail to decode and fall under the corrupt-line policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Page(Page),
    Card(Card),
}

impl Record {
    pub fn id(&self) -> &RecordId {
        match self {
            Record::Page(p) => &p.id,
            Record::Card(c) => &c.id,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Record::Page(p) => p.updated_at,
            Record::Card(c) => c.updated_at,
        }
    }

    pub fn files_mut(&mut self) -> &mut Vec<FileAttachment> {
        match self {
            Record::Page(p) => &mut p.files,
            Record::Card(c) => &mut c.files,
        }
    }

    pub fn touch(&mut self) {
        match self {
            Record::Page(p) => p.touch(),
            Record::Card(c) => c.touch(),
        }
    }
}

// Rebuild every entry from its persisted name; entries without a name are
// dropped rather than producing a dangling URL.
fn refreshed_files(
    files: &[FileAttachment],
    id: &RecordId,
    base_url: &str,
) -> Vec<FileAttachment> {
    files
        .iter()
        .filter(|f| !f.name.is_empty())
        .map(|f| FileAttachment::for_entity(f.name.clone(), id, base_url))
        .collect()
}
