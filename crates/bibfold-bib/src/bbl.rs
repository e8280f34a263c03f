//! Citation-key extraction from compiled `.bbl` bibliography listings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The keys a compiled document actually cites, as stored in
/// `used_bib_entries.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsedKeys {
    pub used_bib_entries: Vec<String>,
}

static ENTRY_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\entry\{([^}]*)\}").unwrap());

/// Extract every `\entry{key}` citation key from `.bbl` content, in order of
/// appearance.
pub fn extract_citation_keys(content: &str) -> Vec<String> {
    ENTRY_KEY_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_keys_in_order_of_appearance() {
        let bbl = r"
\entry{smith2020}{article}{}
  some formatted fields
\entry{jones2019}{inproceedings}{}
";
        assert_eq!(
            extract_citation_keys(bbl),
            vec!["smith2020".to_string(), "jones2019".to_string()]
        );
    }

    #[test]
    fn no_entries_means_no_keys() {
        assert!(extract_citation_keys("\\bibitem{other-format}").is_empty());
    }

    #[test]
    fn used_keys_round_trip_as_json() {
        let used = UsedKeys {
            used_bib_entries: vec!["a".to_string(), "b".to_string()],
        };
        let json = serde_json::to_string_pretty(&used).unwrap();
        let parsed: UsedKeys = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.used_bib_entries, used.used_bib_entries);
    }

    #[test]
    fn missing_top_level_field_is_an_error() {
        assert!(serde_json::from_str::<UsedKeys>("{}").is_err());
    }
}
