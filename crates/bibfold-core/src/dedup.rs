//! Duplicate-entry detection.
//!
//! Entries of the same type are duplicates when they share a citation key or
//! when their titles are within a length-scaled edit distance. The
//! scan is a single left-to-right pass: the first entry of a group is its
//! surviving representative, and grouping is deliberately not a transitive
//! closure — downstream key-replacement scripts are built against the
//! first-match-wins semantics.

use std::collections::{BTreeMap, HashSet};

use rapidfuzz::distance::levenshtein;

use crate::BibRecord;

/// Fraction of the longer title length tolerated as edit distance.
const TITLE_DISTANCE_THRESHOLD: f64 = 0.1;

/// Result of partitioning an entry collection.
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    /// One entry per duplicate group (its representative), plus every entry
    /// that matched nothing, in first-visit order.
    pub unique: Vec<BibRecord>,
    /// The subsumed group members, in input order.
    pub duplicates: Vec<BibRecord>,
    /// Representative key → keys it subsumes.
    pub dup_map: BTreeMap<String, Vec<String>>,
}

/// Title form used for comparison: lowercased, with surrounding whitespace,
/// braces, and quotes trimmed. A missing title compares as "".
fn comparison_title(record: &BibRecord) -> String {
    record
        .title
        .as_deref()
        .unwrap_or("")
        .to_lowercase()
        .trim_matches(|c| matches!(c, ' ' | '\n' | '\r' | '{' | '}' | '"'))
        .to_string()
}

fn titles_match(a: &str, b: &str) -> bool {
    let longest = a.chars().count().max(b.chars().count());
    let distance = levenshtein::distance(a.chars(), b.chars());
    distance as f64 <= longest as f64 * TITLE_DISTANCE_THRESHOLD
}

fn is_match(a: &BibRecord, b: &BibRecord, title_a: &str, title_b: &str) -> bool {
    if !a.entry_type.eq_ignore_ascii_case(&b.entry_type) {
        return false;
    }
    // Entries sharing a key are always one entry, whatever their titles say.
    a.key == b.key || titles_match(title_a, title_b)
}

/// Partition `entries` into unique representatives and subsumed duplicates.
///
/// For each index not yet consumed by an earlier group, every other index is
/// tested against the match predicate; all matches are subsumed under the
/// scan origin. The inner scan does not skip already-consumed indices, so a
/// subsumed key can appear under more than one representative when the
/// predicate is intransitive (A~B and B~C with A≁C).
pub fn detect(entries: &[BibRecord]) -> DedupOutcome {
    let titles: Vec<String> = entries.iter().map(comparison_title).collect();

    let mut consumed: HashSet<usize> = HashSet::new();
    let mut unique_idx: Vec<usize> = Vec::new();
    let mut dup_map: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for i in 0..entries.len() {
        if consumed.contains(&i) {
            continue;
        }
        let mut group = vec![i];
        for j in 0..entries.len() {
            if j != i && is_match(&entries[i], &entries[j], &titles[i], &titles[j]) {
                group.push(j);
            }
        }
        if group.len() > 1 {
            let survivor = &entries[i].key;
            let mut subsumed: Vec<String> = Vec::new();
            for &member in &group[1..] {
                let key = &entries[member].key;
                // A duplicate carrying the survivor's exact key must not end
                // up in the survivor's own subsumed list.
                if key != survivor && !subsumed.iter().any(|k| k == key) {
                    subsumed.push(key.clone());
                }
                consumed.insert(member);
            }
            tracing::debug!(
                survivor = %survivor,
                subsumed = group.len() - 1,
                "duplicate group"
            );
            dup_map.insert(survivor.clone(), subsumed);
        }
        unique_idx.push(i);
    }

    let unique = unique_idx.iter().map(|&i| entries[i].clone()).collect();
    let mut dup_idx: Vec<usize> = consumed.into_iter().collect();
    dup_idx.sort_unstable();
    let duplicates = dup_idx.into_iter().map(|i| entries[i].clone()).collect();

    DedupOutcome {
        unique,
        duplicates,
        dup_map,
    }
}
