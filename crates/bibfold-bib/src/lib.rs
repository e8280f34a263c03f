//! BibTeX file adapter: loads `.bib` files into [`BibRecord`]s and writes
//! record collections back out as BibTeX.
//!
//! Parsing uses the `biblatex` crate with a per-entry recovery fallback:
//! real `.bib` files often carry minor syntax errors (extra braces, raw text
//! separators, non-standard entry types) that fail the whole-file parse, so
//! the content is split at `@` entry boundaries and each chunk is parsed
//! independently, keeping whatever can be recovered.

use std::path::Path;

use biblatex::{Bibliography, Chunk, Entry, Spanned};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use bibfold_core::BibRecord;

pub mod bbl;

#[derive(Error, Debug)]
pub enum BibError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no BibTeX entries found")]
    NoEntries,
}

/// Parse `.bib` content into entry records.
pub fn parse_records(content: &str) -> Result<Vec<BibRecord>, BibError> {
    match Bibliography::parse(content) {
        Ok(bibliography) => {
            let records: Vec<BibRecord> = bibliography.iter().map(record_from_entry).collect();
            if records.is_empty() {
                return Err(BibError::NoEntries);
            }
            Ok(records)
        }
        Err(_) => parse_records_individually(content),
    }
}

/// Split `.bib` content into individual entry chunks and parse each one.
fn parse_records_individually(content: &str) -> Result<Vec<BibRecord>, BibError> {
    static ENTRY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^@[a-zA-Z]").unwrap());

    let positions: Vec<usize> = ENTRY_RE.find_iter(content).map(|m| m.start()).collect();
    if positions.is_empty() {
        return Err(BibError::NoEntries);
    }

    let mut records = Vec::new();
    for i in 0..positions.len() {
        let start = positions[i];
        let end = if i + 1 < positions.len() {
            positions[i + 1]
        } else {
            content.len()
        };
        match Bibliography::parse(&content[start..end]) {
            Ok(bib) => records.extend(bib.iter().map(record_from_entry)),
            Err(e) => tracing::warn!(error = %e, "skipping unparseable entry chunk"),
        }
    }

    if records.is_empty() {
        return Err(BibError::NoEntries);
    }
    Ok(records)
}

/// Load every `.bib` file directly inside `dir`, concatenating their entries
/// in file-enumeration order. In-file entry order is preserved; the order of
/// the files themselves follows the directory listing and is not a stable
/// contract. A file that fails to read or parse contributes nothing — the
/// failure is logged and the batch continues.
pub fn load_directory(dir: &Path) -> Result<Vec<BibRecord>, BibError> {
    let mut records = Vec::new();
    for dent in std::fs::read_dir(dir)? {
        let path = dent?.path();
        let is_bib = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("bib"));
        if !is_bib || !path.is_file() {
            continue;
        }
        tracing::debug!(file = %path.display(), "reading bibliography file");
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "failed to read file, skipping");
                continue;
            }
        };
        match parse_records(&content) {
            Ok(mut parsed) => {
                tracing::debug!(file = %path.display(), entries = parsed.len(), "parsed");
                records.append(&mut parsed);
            }
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "failed to parse file, skipping");
            }
        }
    }
    Ok(records)
}

fn record_from_entry(entry: &Entry) -> BibRecord {
    let mut record = BibRecord::new(entry.entry_type.to_string(), entry.key.clone());
    for (name, value) in entry.fields.iter() {
        record.set_field(&name.to_ascii_lowercase(), chunks_to_string(value));
    }
    record
}

/// Flatten biblatex chunks back into field text, keeping `{…}` verbatim
/// protection and `$…$` math markers so the value round-trips.
fn chunks_to_string(chunks: &[Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|chunk| match &chunk.v {
            Chunk::Normal(s) => s.clone(),
            Chunk::Verbatim(s) => format!("{{{s}}}"),
            Chunk::Math(s) => format!("${s}$"),
        })
        .collect()
}

/// Render one record as a BibTeX entry.
pub fn record_to_bibtex(record: &BibRecord) -> String {
    let mut out = String::new();
    out.push('@');
    out.push_str(&record.entry_type);
    out.push('{');
    out.push_str(&record.key);
    out.push_str(",\n");
    for (name, value) in record.fields() {
        out.push_str("  ");
        out.push_str(name);
        out.push_str(" = {");
        out.push_str(value);
        out.push_str("},\n");
    }
    out.push_str("}\n");
    out
}

/// Render a whole collection, one blank line between entries.
pub fn bibliography_to_string(records: &[BibRecord]) -> String {
    records
        .iter()
        .map(record_to_bibtex)
        .collect::<Vec<_>>()
        .join("\n")
}
