use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use bibfold_bib::bbl::{self, UsedKeys};
use bibfold_core::{VenueTable, dedup, filter, title, venue};

mod logging;
mod replace;

/// bibfold - consolidate BibTeX files into one deduplicated bibliography
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the persistent log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge every .bib file in a directory into a deduplicated bibliography
    Merge {
        /// Directory containing the .bib files
        #[arg(short, long)]
        directory: PathBuf,

        /// Journal-name substitution table (name=canonical lines)
        #[arg(long)]
        journal_names: Option<PathBuf>,

        /// Conference-name substitution table (name=canonical lines)
        #[arg(long)]
        conference_names: Option<PathBuf>,

        /// JSON file listing the citation keys the document uses
        #[arg(long, default_value = "used_bib_entries.json")]
        used_keys: PathBuf,
    },

    /// Extract citation keys from a compiled .bbl listing
    ExtractKeys {
        /// Path to the .bbl file
        bbl_file: PathBuf,

        /// Output JSON path
        #[arg(short, long, default_value = "used_bib_entries.json")]
        output: PathBuf,
    },

    /// Generate a shell script replacing duplicate keys with their survivors
    GenReplace {
        /// Duplicate-key map produced by merge
        #[arg(long, default_value = "dup-maps.json")]
        map: PathBuf,

        /// Output script path
        #[arg(short, long, default_value = "replace_all_duplicated_bibkeys.sh")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Resolve logging configuration: CLI flags > env vars > defaults
    let log_file = cli
        .log_file
        .or_else(|| std::env::var("BIBFOLD_LOG_FILE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("bibfold.log"));
    let log_level = cli
        .log_level
        .or_else(|| std::env::var("BIBFOLD_LOG_LEVEL").ok())
        .unwrap_or_else(|| "debug".to_string());

    let _guard = logging::init(logging::LogOptions {
        file: log_file,
        level: log_level,
    })?;

    match cli.command {
        Command::Merge {
            directory,
            journal_names,
            conference_names,
            used_keys,
        } => merge(
            &directory,
            journal_names.as_deref(),
            conference_names.as_deref(),
            &used_keys,
        ),
        Command::ExtractKeys { bbl_file, output } => extract_keys(&bbl_file, &output),
        Command::GenReplace { map, output } => gen_replace(&map, &output),
    }
}

/// The full consolidation pipeline. Outputs are written as soon as each step
/// completes; a failure later in the pipeline leaves earlier outputs on
/// disk.
fn merge(
    directory: &Path,
    journal_names: Option<&Path>,
    conference_names: Option<&Path>,
    used_keys: &Path,
) -> anyhow::Result<()> {
    if !directory.is_dir() {
        anyhow::bail!("not a directory: {}", directory.display());
    }

    let entries = bibfold_bib::load_directory(directory)
        .with_context(|| format!("failed to read directory {}", directory.display()))?;
    tracing::info!(entries = entries.len(), "loaded bibliography entries");

    std::fs::write(
        "merged_raw.bib",
        bibfold_bib::bibliography_to_string(&entries),
    )
    .context("failed to write merged_raw.bib")?;

    let outcome = dedup::detect(&entries);
    tracing::info!(
        unique = outcome.unique.len(),
        duplicates = outcome.duplicates.len(),
        "duplicate detection complete"
    );

    std::fs::write(
        "merged_unique.bib",
        bibfold_bib::bibliography_to_string(&outcome.unique),
    )
    .context("failed to write merged_unique.bib")?;
    std::fs::write(
        "merged_dup.bib",
        bibfold_bib::bibliography_to_string(&outcome.duplicates),
    )
    .context("failed to write merged_dup.bib")?;
    let map_json = serde_json::to_string_pretty(&outcome.dup_map)
        .context("failed to serialize duplicate map")?;
    std::fs::write("dup-maps.json", map_json).context("failed to write dup-maps.json")?;

    let mut unique = outcome.unique;
    for record in &mut unique {
        let Some(raw_title) = record.title.clone() else {
            continue;
        };
        match title::normalize(&raw_title) {
            Ok(normalized) => record.title = Some(normalized),
            // A malformed title must not be silently mis-cased; report it
            // and keep the original text.
            Err(e) => tracing::error!(key = %record.key, error = %e, "title left unchanged"),
        }
    }

    let journals = load_table(journal_names)?;
    let conferences = load_table(conference_names)?;
    venue::unify_venues(&mut unique, &journals, &conferences);

    let used_content = std::fs::read_to_string(used_keys)
        .with_context(|| format!("failed to read used-keys file {}", used_keys.display()))?;
    let used: UsedKeys = serde_json::from_str(&used_content)
        .with_context(|| format!("invalid used-keys file {}", used_keys.display()))?;
    let used_set: HashSet<String> = used.used_bib_entries.into_iter().collect();

    let curated = filter::filter_used(unique, &used_set);
    tracing::info!(entries = curated.len(), "curated bibliography");
    std::fs::write(
        "merged_final.bib",
        bibfold_bib::bibliography_to_string(&curated),
    )
    .context("failed to write merged_final.bib")?;

    Ok(())
}

fn load_table(path: Option<&Path>) -> anyhow::Result<VenueTable> {
    match path {
        Some(path) => {
            let table = VenueTable::from_path(path)
                .with_context(|| format!("failed to read venue table {}", path.display()))?;
            tracing::debug!(table = %path.display(), entries = table.len(), "loaded venue table");
            Ok(table)
        }
        None => Ok(VenueTable::new()),
    }
}

fn extract_keys(bbl_file: &Path, output: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(bbl_file)
        .with_context(|| format!("failed to read {}", bbl_file.display()))?;
    let keys = bbl::extract_citation_keys(&content);
    tracing::info!(keys = keys.len(), file = %bbl_file.display(), "extracted citation keys");

    let json = serde_json::to_string_pretty(&UsedKeys {
        used_bib_entries: keys,
    })
    .context("failed to serialize used keys")?;
    std::fs::write(output, json).with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

fn gen_replace(map: &Path, output: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(map)
        .with_context(|| format!("failed to read duplicate map {}", map.display()))?;
    let dup_map: BTreeMap<String, Vec<String>> = serde_json::from_str(&content)
        .with_context(|| format!("invalid duplicate map {}", map.display()))?;

    let script = replace::render_script(&dup_map);
    std::fs::write(output, script)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(script = %output.display(), "wrote replacement script");
    Ok(())
}
