//! Final curation: keep only the entries a document actually cites.

use std::collections::HashSet;

use crate::BibRecord;

/// Keep the entries whose key is in `used`, preserving their relative order.
pub fn filter_used(entries: Vec<BibRecord>, used: &HashSet<String>) -> Vec<BibRecord> {
    entries
        .into_iter()
        .filter(|entry| used.contains(&entry.key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_used_entries_in_order() {
        let entries = vec![
            BibRecord::new("article", "a"),
            BibRecord::new("article", "b"),
            BibRecord::new("article", "c"),
        ];
        let used: HashSet<String> = ["b", "c", "d"].iter().map(|s| s.to_string()).collect();

        let kept = filter_used(entries, &used);
        let keys: Vec<&str> = kept.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn empty_used_set_drops_everything() {
        let entries = vec![BibRecord::new("article", "a")];
        assert!(filter_used(entries, &HashSet::new()).is_empty());
    }
}
