//! Id-addressed card operations.
//!
//! Cards are the dynamic records: created and deleted by admin actions,
//! listed most-recently-modified first. Delete reports absence as `false`
//! rather than an error, so a repeated delete is a no-op at the boundary.

use crate::error::{CardstockError, Result};
use crate::model::{Card, Record, RecordId};
use crate::store::RecordStore;

pub fn get<S: RecordStore>(store: &S, id: &RecordId, base_url: &str) -> Result<Option<Card>> {
    let card = store.load_all()?.into_iter().find_map(|record| match record {
        Record::Card(c) if c.id == *id => Some(c),
        _ => None,
    });
    Ok(card.map(|mut c| {
        c.refresh_files(base_url);
        c
    }))
}

/// All cards sorted by `updated_at` descending. The sort is stable, so cards
/// sharing a timestamp keep their store order.
pub fn list<S: RecordStore>(store: &S, base_url: &str) -> Result<Vec<Card>> {
    let mut cards: Vec<Card> = store
        .load_all()?
        .into_iter()
        .filter_map(|record| match record {
            Record::Card(mut c) => {
                c.refresh_files(base_url);
                Some(c)
            }
            _ => None,
        })
        .collect();
    cards.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(cards)
}

/// Replace the card stored under `id`, or append it if none exists yet.
pub fn upsert<S: RecordStore>(store: &S, id: &RecordId, mut card: Card) -> Result<()> {
    if card.title.trim().is_empty() {
        return Err(CardstockError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    card.id = id.clone();

    let id = id.clone();
    store.update(move |records| {
        let pos = records
            .iter()
            .position(|r| matches!(r, Record::Card(c) if c.id == id));
        match pos {
            Some(idx) => records[idx] = Record::Card(card),
            None => records.push(Record::Card(card)),
        }
    })
}

/// Remove the card from the store. `Ok(false)` when no card has this id;
/// the caller decides whether that is a 404 or a silent no-op.
pub fn delete<S: RecordStore>(store: &S, id: &RecordId) -> Result<bool> {
    let id = id.clone();
    store.update(move |records| {
        let before = records.len();
        records.retain(|r| !matches!(r, Record::Card(c) if c.id == id));
        records.len() != before
    })
}
