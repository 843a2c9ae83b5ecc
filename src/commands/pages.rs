//! Slug-addressed page operations.
//!
//! Pages are the fixed, pre-seeded records: looked up by lowercase slug,
//! edited in place, never deleted. Upsert replaces the first matching page
//! record or appends when the slug is new, inside a single store critical
//! section.

use crate::error::{CardstockError, Result};
use crate::model::{Page, Record};
use crate::store::RecordStore;

pub(crate) fn normalize_slug(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Look a page up by slug. Attachment URLs are recomputed before the page is
/// returned; stored URLs are never trusted.
pub fn get<S: RecordStore>(store: &S, slug: &str, base_url: &str) -> Result<Option<Page>> {
    let slug = normalize_slug(slug);
    let page = store.load_all()?.into_iter().find_map(|record| match record {
        Record::Page(p) if p.slug == slug => Some(p),
        _ => None,
    });
    Ok(page.map(|mut p| {
        p.refresh_files(base_url);
        p
    }))
}

/// All pages, in store order, with refreshed attachment URLs.
pub fn list<S: RecordStore>(store: &S, base_url: &str) -> Result<Vec<Page>> {
    let pages = store
        .load_all()?
        .into_iter()
        .filter_map(|record| match record {
            Record::Page(mut p) => {
                p.refresh_files(base_url);
                Some(p)
            }
            _ => None,
        })
        .collect();
    Ok(pages)
}

/// Replace the page stored under `slug`, or append it if none exists yet.
/// The scan and the rewrite happen under one lock acquisition.
pub fn upsert<S: RecordStore>(store: &S, slug: &str, mut page: Page) -> Result<()> {
    let slug = normalize_slug(slug);
    if slug.is_empty() {
        return Err(CardstockError::Validation(
            "page slug must not be empty".to_string(),
        ));
    }
    if page.title.trim().is_empty() {
        return Err(CardstockError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    page.slug = slug.clone();

    store.update(move |records| {
        let pos = records
            .iter()
            .position(|r| matches!(r, Record::Page(p) if p.slug == slug));
        match pos {
            Some(idx) => records[idx] = Record::Page(page),
            None => records.push(Record::Page(page)),
        }
    })
}
