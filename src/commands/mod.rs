//! # Command Layer
//!
//! The entity repository: typed operations over the record store, one module
//! per concern, all generic over [`RecordStore`](crate::store::RecordStore)
//! so tests run against `InMemoryStore` and production against `JsonlStore`.
//!
//! Commands never touch stdout, sessions or request state; they take plain
//! arguments and return plain types. Partial failures that the end user
//! should see (a rejected upload in an otherwise fine batch) come back as
//! structured [`CmdMessage`]s for the serving layer to render as flash
//! notices.
//!
//! - [`pages`]: slug-addressed page operations
//! - [`cards`]: id-addressed card operations
//! - [`files`]: attachment orchestration across store and upload folder
//! - [`seed`]: startup seeding of the fixed pages

use serde::Serialize;

pub mod cards;
pub mod files;
pub mod pages;
pub mod seed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-visible notice produced by a command, rendered by the serving
/// layer (typically as a flash message).
#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}
