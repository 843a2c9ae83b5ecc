//! Startup seeding of the fixed pages.
//!
//! Each deployment ships a small set of page seeds. On startup, any seed
//! whose slug is not yet in the store gets a fresh page record; existing
//! pages are left untouched, so admin edits survive restarts.

use std::collections::HashSet;

use crate::commands::CmdMessage;
use crate::error::Result;
use crate::model::{Page, PageSeed, Record};
use crate::store::RecordStore;

/// Insert one page per seed slug not already present. Runs as a single
/// store critical section; returns an info notice per page created.
pub fn run<S: RecordStore>(store: &S, seeds: &[PageSeed]) -> Result<Vec<CmdMessage>> {
    if seeds.is_empty() {
        return Ok(Vec::new());
    }

    store.update(|records| {
        let existing: HashSet<String> = records
            .iter()
            .filter_map(|r| match r {
                Record::Page(p) => Some(p.slug.clone()),
                _ => None,
            })
            .collect();

        let mut messages = Vec::new();
        for seed in seeds {
            let page = Page::from_seed(seed);
            if existing.contains(&page.slug) {
                continue;
            }
            messages.push(CmdMessage::info(format!("Seeded page \"{}\"", page.slug)));
            records.push(Record::Page(page));
        }
        messages
    })
}
