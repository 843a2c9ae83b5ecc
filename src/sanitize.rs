//! # Identifier & Filename Sanitization
//!
//! Everything that crosses from the request boundary into a path or a record
//! lookup goes through this module first. Two rules apply:
//!
//! - **Ids** are opaque lowercase-hex tokens, 8 to 32 characters. Anything
//!   else is rejected and treated by callers as "not found", never as an
//!   error worth surfacing.
//! - **Filenames** are reduced to a safe basename: directory components and
//!   unsafe characters are stripped, and a name that sanitizes to nothing is
//!   rejected.
//!
//! Collision handling (`unique_name`) re-checks the live folder contents on
//! every call; nothing here caches filesystem state.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;

/// Ids shorter than this are rejected.
pub const ID_MIN_LEN: usize = 8;
/// Ids longer than this are rejected.
pub const ID_MAX_LEN: usize = 32;

const FILENAME_MAX_LEN: usize = 255;

/// Extensions accepted for uploads: common image, video and office/archive
/// document types.
pub static DEFAULT_ALLOWED_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // images
        "jpg", "jpeg", "png", "gif", "webp", // videos
        "mp4", "webm", "mov", // documents / archives
        "pdf", "txt", "csv", "zip", "7z", "rar", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    ]
    .into_iter()
    .collect()
});

/// Validate an externally supplied id.
///
/// Case-folds the input, then accepts only 8-32 character lowercase-hex
/// strings. Returns `None` for everything else; applying the function twice
/// yields the same result as applying it once.
pub fn sanitize_id(raw: &str) -> Option<String> {
    let folded = raw.to_ascii_lowercase();
    let hex = folded.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    if hex && (ID_MIN_LEN..=ID_MAX_LEN).contains(&folded.len()) {
        Some(folded)
    } else {
        None
    }
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Directory components are dropped, whitespace becomes `_`, and any
/// character outside `[A-Za-z0-9._-]` is removed. Leading and trailing dots
/// and underscores are trimmed, which also kills `.` / `..` and hidden-file
/// names. Returns `None` if nothing safe remains.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .take(FILENAME_MAX_LEN)
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The lowercased suffix after the last `.`, or `None` when the name has no
/// usable extension.
pub fn extension_of(name: &str) -> Option<String> {
    let idx = name.rfind('.')?;
    let ext = &name[idx + 1..];
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Whether the filename's extension is in the given allow-list.
/// Case-insensitive; names without an extension are rejected.
pub fn is_allowed_extension(name: &str, allowed: &HashSet<String>) -> bool {
    extension_of(name)
        .map(|ext| allowed.contains(&ext))
        .unwrap_or(false)
}

/// Find a name that does not collide with the current contents of `folder`.
///
/// An existing `a.png` turns the candidate into `a_2.png`, then `a_3.png`,
/// and so on. The folder is re-checked on every call since concurrent admin
/// edits may add files at any time.
pub fn unique_name(folder: &Path, name: &str) -> String {
    if !folder.join(name).exists() {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx + 1..]),
        _ => (name, ""),
    };

    let mut counter = 2;
    loop {
        let candidate = if ext.is_empty() {
            format!("{stem}_{counter}")
        } else {
            format!("{stem}_{counter}.{ext}")
        };
        if !folder.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}
