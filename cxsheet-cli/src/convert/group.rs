//! Grouping of flat rows into collections and phrases

use std::collections::{BTreeMap, BTreeSet};

use super::rows::{AdvancedPhraseRow, Keyed};
use super::schema::SchemaProblem;

/// Partition rows by display name. Every row lands in exactly one group and
/// rows keep their input order inside the group.
pub fn group_by_name<R: Keyed>(rows: Vec<R>) -> BTreeMap<String, Vec<R>> {
    let mut groups: BTreeMap<String, Vec<R>> = BTreeMap::new();
    for row in rows {
        groups
            .entry(row.display_name().to_string())
            .or_default()
            .push(row);
    }
    groups
}

/// Flag a collection whose `training_phrase` ordinals leave more empty
/// phrases than filled ones. [`group_parts`] allocates one slot per ordinal,
/// so this must pass before it runs.
pub fn sparse_ordinals(display_name: &str, rows: &[AdvancedPhraseRow]) -> Option<SchemaProblem> {
    let max = rows.iter().map(|r| r.training_phrase).max()?;
    let used = rows
        .iter()
        .map(|r| r.training_phrase)
        .collect::<BTreeSet<_>>()
        .len();

    let phrases = u64::from(max) + 1;
    (phrases > 2 * used as u64).then(|| SchemaProblem::SparseOrdinals {
        display_name: display_name.to_string(),
        max,
        used,
    })
}

/// Split one collection's advanced rows into phrases.
///
/// The result always has `max(training_phrase) + 1` entries, so an ordinal
/// that never appears yields an empty phrase. Parts inside a phrase are
/// ordered by `part`; equal ordinals keep their input order.
pub fn group_parts(rows: &[AdvancedPhraseRow]) -> Vec<Vec<&AdvancedPhraseRow>> {
    let Some(max) = rows.iter().map(|r| r.training_phrase).max() else {
        return Vec::new();
    };

    let mut phrases: Vec<Vec<&AdvancedPhraseRow>> = vec![Vec::new(); max as usize + 1];
    for row in rows {
        phrases[row.training_phrase as usize].push(row);
    }
    for parts in &mut phrases {
        parts.sort_by_key(|r| r.part);
    }
    phrases
}
