//! End-to-end adapter test: load a directory of `.bib` files, deduplicate,
//! and confirm the surviving entries serialize and parse back intact.

use std::collections::BTreeSet;

use bibfold_core::dedup;

#[test]
fn directory_load_dedup_and_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    // The same entry (same key, same title) appears in both files, so the
    // duplicate-map entry is identical whichever file enumerates first.
    std::fs::write(
        dir.path().join("first.bib"),
        r#"
@article{unique-a,
  title = {Adaptive Batching for Stream Processors},
  year = {2019},
}

@inproceedings{shared2020,
  title = {Lock-Free Queues in Practice},
  booktitle = {SOSP},
  year = {2020},
}
"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("second.bib"),
        r#"
@inproceedings{shared2020,
  title = {Lock-Free Queues in Practice},
  booktitle = {SOSP},
  year = {2020},
}

@article{unique-b,
  title = {Cost Models for Distributed Joins},
  year = {2021},
}
"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("broken.bib"), "not bibtex at all").unwrap();

    let entries = bibfold_bib::load_directory(dir.path()).unwrap();
    assert_eq!(entries.len(), 4);

    let outcome = dedup::detect(&entries);
    assert_eq!(outcome.unique.len(), 3);
    assert_eq!(outcome.duplicates.len(), 1);
    assert_eq!(outcome.duplicates[0].key, "shared2020");
    // Both copies carry the surviving key, so nothing else is subsumed.
    assert_eq!(outcome.dup_map["shared2020"], Vec::<String>::new());

    let rendered = bibfold_bib::bibliography_to_string(&outcome.unique);
    let reparsed = bibfold_bib::parse_records(&rendered).unwrap();

    let expected: BTreeSet<&str> = ["unique-a", "shared2020", "unique-b"].into_iter().collect();
    let actual: BTreeSet<&str> = reparsed.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(actual, expected);

    let shared = reparsed.iter().find(|r| r.key == "shared2020").unwrap();
    assert_eq!(shared.booktitle.as_deref(), Some("SOSP"));
    assert_eq!(shared.year.as_deref(), Some("2020"));
}
