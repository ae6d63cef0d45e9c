//! Integration tests for cousins.
//!
//! Drive the public API end to end: a rules file on disk, a note export,
//! the evaluator and the sinks.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::too_many_lines,
    clippy::doc_markdown
)]

use cousins::models::{Comparator, MatchRule, NoteId, NoteTypeId};
use cousins::services::{EXACT_LABEL, RuleSetEvaluator};
use cousins::storage::{
    InMemoryReportingSink, InMemorySuppressionSink, JsonFileRuleStore, NoteCollection, RULES_KEY,
    RuleRepository, RuleStore,
};
use cousins::{Error, MatchSettings};
use std::collections::BTreeSet;
use std::io::Write;
use tempfile::TempDir;

const BASIC: NoteTypeId = NoteTypeId::new(1);
const CLOZE: NoteTypeId = NoteTypeId::new(2);

fn ids(values: &[i64]) -> BTreeSet<NoteId> {
    values.iter().copied().map(NoteId::new).collect()
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

const NOTES_CSV: &str = "\
id,type_id,field,value
1,1,Back,abcdefgh
2,1,Back,abcdefxy
3,1,Back,zzzz
4,1,Back,zzzz
5,2,Text,{{c1::Paris}} is the capital
6,1,Back,paris is nice
7,1,Back,Parisian food
";

#[test]
fn test_error_types() {
    let err = Error::InvalidInput("test message".to_string());
    let display = format!("{err}");
    assert!(display.contains("invalid input"));
    assert!(display.contains("test message"));

    let err = Error::OperationFailed {
        operation: "read".to_string(),
        cause: "file not found".to_string(),
    };
    let display = format!("{err}");
    assert!(display.contains("read"));
    assert!(display.contains("file not found"));

    let err = Error::InvalidComparatorName("fuzzy".to_string());
    assert!(format!("{err}").contains("fuzzy"));
}

#[test]
fn test_rules_file_lifecycle() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "config.json", r#"{"other_setting": true}"#);
    let mut repo = RuleRepository::new(JsonFileRuleStore::new(&path));

    assert!(repo.load().unwrap().is_empty());

    let similarity = MatchRule::new(BASIC, "Back", BASIC, "Back", Comparator::Similarity, 0.9);
    let prefix = MatchRule::new(BASIC, "Back", BASIC, "Back", Comparator::Prefix, 0.65);
    repo.add(similarity.clone()).unwrap();
    let rules = repo.add(prefix.clone()).unwrap();
    assert_eq!(rules.len(), 2);

    // Rows are saved sorted, so prefix comes before similarity.
    let loaded = repo.load().unwrap();
    assert_eq!(loaded.rules(), &[prefix, similarity.clone()]);

    let removed = repo.remove(0).unwrap();
    assert_eq!(removed.comparator, Comparator::Prefix);
    assert_eq!(repo.load().unwrap().rules(), &[similarity]);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["other_setting"], serde_json::Value::Bool(true));
    assert_eq!(raw[RULES_KEY].as_array().unwrap().len(), 1);
}

#[test]
fn test_rules_file_skips_bad_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "config.json",
        r#"{"anki_cousins": [
            [1, "Back", 1, "Back", "prefix", 0.5],
            [1, "Back", 1, "Back", "fuzzy", 0.5],
            [1, "Back", 1],
            [1, "Back", 1, "Back", "similarity", 1.5]
        ]}"#,
    );
    let repo = RuleRepository::new(JsonFileRuleStore::new(&path));

    let checked = repo.load_checked().unwrap();
    assert_eq!(checked.rules.len(), 1);
    let skipped: Vec<usize> = checked.skipped.iter().map(|(index, _)| *index).collect();
    assert_eq!(skipped, vec![1, 2, 3]);
    assert!(matches!(
        checked.skipped[0].1,
        Error::InvalidComparatorName(_)
    ));
    assert!(!checked.is_clean());

    assert_eq!(repo.load().unwrap().len(), 1);
}

#[test]
fn test_remove_out_of_range_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let mut repo = RuleRepository::new(JsonFileRuleStore::new(&path));
    repo.add(MatchRule::new(
        BASIC,
        "Back",
        BASIC,
        "Back",
        Comparator::ContainedBy,
        1.0,
    ))
    .unwrap();

    let before = std::fs::read_to_string(&path).unwrap();
    assert!(repo.remove(5).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_suppression_from_csv_export() {
    let dir = TempDir::new().unwrap();
    let notes_path = write_file(&dir, "notes.csv", NOTES_CSV);
    let notes = NoteCollection::from_path(&notes_path).unwrap();
    assert_eq!(notes.len(), 7);

    let rules = vec![
        MatchRule::new(BASIC, "Back", BASIC, "Back", Comparator::Prefix, 0.65),
        MatchRule::new(CLOZE, "Text", BASIC, "Back", Comparator::ClozeContainedBy, 1.0),
    ];
    let evaluator = RuleSetEvaluator::default();

    let first = notes.get(NoteId::new(1)).unwrap();
    let mut sink = InMemorySuppressionSink::new();
    let cousins = evaluator
        .suppress_cousins(&rules, first, &notes, &mut sink)
        .unwrap();
    assert_eq!(cousins, ids(&[2]));
    assert_eq!(sink.suppressed(), &ids(&[2]));

    // The cloze answer matches a whole word regardless of case.
    let cloze = notes.get(NoteId::new(5)).unwrap();
    let cousins = evaluator
        .evaluate_for_suppression(&rules, cloze, &notes)
        .unwrap();
    assert_eq!(cousins, ids(&[6]));
}

#[test]
fn test_suppression_without_cousins_skips_sink() {
    let notes = NoteCollection::from_csv(NOTES_CSV.as_bytes()).unwrap();
    let rules = vec![MatchRule::new(
        BASIC,
        "Back",
        BASIC,
        "Back",
        Comparator::Similarity,
        0.95,
    )];

    let lonely = notes.get(NoteId::new(7)).unwrap();
    let mut sink = InMemorySuppressionSink::new();
    let cousins = RuleSetEvaluator::default()
        .suppress_cousins(&rules, lonely, &notes, &mut sink)
        .unwrap();

    assert!(cousins.is_empty());
    assert_eq!(sink.batches(), 0);
}

#[test]
fn test_duplicate_report_with_exact_groups() {
    let notes = NoteCollection::from_csv(NOTES_CSV.as_bytes()).unwrap();
    let rules = vec![MatchRule::new(
        BASIC,
        "Back",
        BASIC,
        "Back",
        Comparator::Prefix,
        0.65,
    )];
    let mut sink = InMemoryReportingSink::new();

    let groups = RuleSetEvaluator::default()
        .report_duplicates(&rules, &notes, None, true, &mut sink)
        .unwrap();

    let labels: Vec<&str> = groups.iter().map(|group| group.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "[exact] zzzz",
            "[prefix] abcdefgh",
            "[prefix] abcdefxy",
            "[prefix] zzzz",
        ]
    );
    assert!(labels[0].starts_with(EXACT_LABEL));
    assert_eq!(groups[0].note_ids, ids(&[3, 4]));
    assert_eq!(groups[1].note_ids, ids(&[1, 2]));
    assert_eq!(sink.groups(), groups.as_slice());
}

#[test]
fn test_duplicate_report_field_filter() {
    let notes = NoteCollection::from_csv(NOTES_CSV.as_bytes()).unwrap();
    let rules = vec![MatchRule::new(
        BASIC,
        "Back",
        BASIC,
        "Back",
        Comparator::Prefix,
        0.65,
    )];
    let mut sink = InMemoryReportingSink::new();

    let groups = RuleSetEvaluator::default()
        .report_duplicates(&rules, &notes, Some("Front"), true, &mut sink)
        .unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_html_stripped_pools_for_reporting() {
    let json = r#"[
        {"id": 1, "type_id": 1, "fields": {"Back": "<b>Paris</b>"}},
        {"id": 2, "type_id": 1, "fields": {"Back": "Paris is nice"}}
    ]"#;
    let rules = vec![MatchRule::new(
        BASIC,
        "Back",
        BASIC,
        "Back",
        Comparator::ContainedBy,
        1.0,
    )];
    let evaluator = RuleSetEvaluator::default();

    let raw = NoteCollection::from_json(json.as_bytes()).unwrap();
    assert!(
        evaluator
            .evaluate_for_grouping(&rules, &raw, None)
            .unwrap()
            .is_empty()
    );

    let stripped = NoteCollection::from_json(json.as_bytes())
        .unwrap()
        .with_html_stripped(true);
    let groups = evaluator
        .evaluate_for_grouping(&rules, &stripped, None)
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].label, "[contained_by] Paris");
    assert_eq!(groups[0].note_ids, ids(&[1, 2]));
}

#[test]
fn test_min_length_setting_is_honored() {
    let notes = NoteCollection::from_csv(NOTES_CSV.as_bytes()).unwrap();
    let rules = vec![MatchRule::new(
        BASIC,
        "Back",
        BASIC,
        "Back",
        Comparator::Prefix,
        0.65,
    )];

    let strict = RuleSetEvaluator::new(MatchSettings::default().with_min_length(5));
    let groups = strict.evaluate_for_grouping(&rules, &notes, None).unwrap();
    assert!(groups.iter().all(|group| group.label != "[prefix] zzzz"));
    assert_eq!(groups.len(), 2);
}

#[test]
fn test_json_store_rejects_non_object_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "config.json", "[1, 2, 3]");
    let store = JsonFileRuleStore::new(&path);

    assert!(matches!(store.load_rows(), Err(Error::InvalidInput(_))));
}

#[test]
fn test_exact_groups_compare_stripped_markup_case_sensitively() {
    let json = r#"[
        {"id": 1, "type_id": 1, "fields": {"Back": "<b>Paris is nice</b>"}},
        {"id": 2, "type_id": 1, "fields": {"Back": "Paris is nice"}},
        {"id": 3, "type_id": 1, "fields": {"Back": "paris is nice"}}
    ]"#;
    let notes = NoteCollection::from_json(json.as_bytes())
        .unwrap()
        .with_html_stripped(true);
    let mut sink = InMemoryReportingSink::new();

    let groups = RuleSetEvaluator::default()
        .report_duplicates(&[], &notes, Some("Back"), true, &mut sink)
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].label, "[exact] Paris is nice");
    assert_eq!(groups[0].note_ids, ids(&[1, 2]));
}
