use std::collections::BTreeMap;

pub mod dedup;
pub mod filter;
pub mod title;
pub mod venue;

// Re-export for convenience
pub use dedup::{DedupOutcome, detect};
pub use filter::filter_used;
pub use title::TitleError;
pub use venue::VenueTable;

/// A single bibliography entry.
///
/// The fields the pipeline actually touches (title, venue names) are typed;
/// everything else a source file carried rides along in `extra` so entries
/// serialize back without loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibRecord {
    /// Entry type tag, e.g. "article" or "inproceedings". Compared
    /// case-insensitively.
    pub entry_type: String,
    /// Citation key. Compared case-sensitively.
    pub key: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub journal: Option<String>,
    pub booktitle: Option<String>,
    pub year: Option<String>,
    /// Fields outside the well-known set, name → raw value.
    pub extra: BTreeMap<String, String>,
}

impl BibRecord {
    pub fn new(entry_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            key: key.into(),
            title: None,
            author: None,
            journal: None,
            booktitle: None,
            year: None,
            extra: BTreeMap::new(),
        }
    }

    /// Store a field value, routing well-known names to their typed slots.
    /// `name` must already be lowercase.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "author" => self.author = Some(value),
            "journal" => self.journal = Some(value),
            "booktitle" => self.booktitle = Some(value),
            "year" => self.year = Some(value),
            _ => {
                self.extra.insert(name.to_string(), value);
            }
        }
    }

    /// Look up a field value by lowercase name.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => self.title.as_deref(),
            "author" => self.author.as_deref(),
            "journal" => self.journal.as_deref(),
            "booktitle" => self.booktitle.as_deref(),
            "year" => self.year.as_deref(),
            _ => self.extra.get(name).map(String::as_str),
        }
    }

    /// All present fields, well-known ones first in a fixed order, then the
    /// overflow fields in name order.
    pub fn fields(&self) -> Vec<(&str, &str)> {
        let mut fields = Vec::with_capacity(5 + self.extra.len());
        for name in ["title", "author", "journal", "booktitle", "year"] {
            if let Some(value) = self.field(name) {
                fields.push((name, value));
            }
        }
        for (name, value) in &self.extra {
            fields.push((name.as_str(), value.as_str()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_field_routes_known_names() {
        let mut record = BibRecord::new("article", "smith2020");
        record.set_field("title", "A Title".to_string());
        record.set_field("journal", "Nature".to_string());
        record.set_field("volume", "7".to_string());

        assert_eq!(record.title.as_deref(), Some("A Title"));
        assert_eq!(record.journal.as_deref(), Some("Nature"));
        assert_eq!(record.extra.get("volume").map(String::as_str), Some("7"));
        assert_eq!(record.field("volume"), Some("7"));
    }

    #[test]
    fn fields_lists_known_before_extra() {
        let mut record = BibRecord::new("article", "smith2020");
        record.set_field("year", "2020".to_string());
        record.set_field("title", "A Title".to_string());
        record.set_field("doi", "10.1/x".to_string());

        let names: Vec<&str> = record.fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["title", "year", "doi"]);
    }
}
