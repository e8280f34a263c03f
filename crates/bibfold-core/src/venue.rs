//! Venue-name unification.
//!
//! Journal and conference names are rewritten from externally supplied
//! substitution tables, one `name=canonical` pair per line.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use crate::BibRecord;

/// Literal venue name → canonical replacement.
#[derive(Debug, Clone, Default)]
pub struct VenueTable {
    entries: BTreeMap<String, String>,
}

impl VenueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name=canonical` lines. Lines without a separator are skipped;
    /// both sides are trimmed.
    pub fn parse(content: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in content.lines() {
            let Some((name, canonical)) = line.split_once('=') else {
                continue;
            };
            entries.insert(name.trim().to_string(), canonical.trim().to_string());
        }
        Self { entries }
    }

    pub fn from_path(path: &Path) -> io::Result<Self> {
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rewrite venue fields in place: `booktitle` for inproceedings entries via
/// the conference table, `journal` for article entries via the journal
/// table. Entries without a table hit are left untouched.
pub fn unify_venues(entries: &mut [BibRecord], journals: &VenueTable, conferences: &VenueTable) {
    for entry in entries {
        if entry.entry_type.eq_ignore_ascii_case("inproceedings") {
            let hit = entry
                .booktitle
                .as_deref()
                .and_then(|name| conferences.get(name))
                .map(str::to_string);
            if let Some(canonical) = hit {
                tracing::debug!(key = %entry.key, venue = %canonical, "unified conference name");
                entry.booktitle = Some(canonical);
            }
        } else if entry.entry_type.eq_ignore_ascii_case("article") {
            let hit = entry
                .journal
                .as_deref()
                .and_then(|name| journals.get(name))
                .map(str::to_string);
            if let Some(canonical) = hit {
                tracing::debug!(key = %entry.key, venue = %canonical, "unified journal name");
                entry.journal = Some(canonical);
            }
        }
    }
}
