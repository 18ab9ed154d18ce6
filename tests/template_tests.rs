//! Template loading, validation and substitution against fixture files.

use fluke_engine::core::placeholder::{all_required_indices, required_indices, unused_input_keys};
use fluke_engine::core::substitution::{substitute, AnswerSet, SubstitutionError};
use fluke_engine::schema::prompt::PromptIndex;
use fluke_engine::schema::template::{StoryRecord, StoryTemplate, TemplateError};
use std::collections::{BTreeMap, BTreeSet};

fn set(values: &[u32]) -> BTreeSet<PromptIndex> {
    values.iter().copied().map(PromptIndex).collect()
}

fn map(pairs: &[(u32, &str)]) -> BTreeMap<PromptIndex, String> {
    pairs
        .iter()
        .map(|(k, v)| (PromptIndex(*k), v.to_string()))
        .collect()
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{name}")).unwrap()
}

#[test]
fn picnic_fixture_loads() {
    let t = StoryTemplate::from_json(&fixture("picnic.fluke")).unwrap();
    assert_eq!(t.filename(), "picnic.fluke");
    assert_eq!(t.input_keys(), set(&[1, 2, 3, 4]));
    assert!(t.unused_input_keys().is_empty());
    assert_eq!(all_required_indices(t.title(), t.body()), set(&[1, 2, 3, 4]));
}

#[test]
fn picnic_plays_through() {
    let t = StoryTemplate::from_json(&fixture("picnic.fluke")).unwrap();
    let answers: AnswerSet = map(&[(1, "Morgan"), (2, " grapes "), (3, "goose"), (4, "honking")]);
    let story = t.substitute(&answers).unwrap();
    assert_eq!(story.title, "Morgan's Picnic");
    assert!(story.body.starts_with("Morgan packed a basket full of grapes and"));
    assert!(story.body.ends_with("Morgan shared the grapes anyway."));
    for index in answers.keys() {
        assert!(!story.title.contains(&index.token()));
        assert!(!story.body.contains(&index.token()));
    }
}

#[test]
fn legacy_fixture_uses_story_field_and_has_unused_prompt() {
    let t = StoryTemplate::from_json(&fixture("legacy_story.fluke")).unwrap();
    assert_eq!(t.body(), "{1}! I have lost my {2} again.");
    assert_eq!(t.unused_input_keys(), set(&[5]));
}

#[test]
fn undefined_fixture_rejected_with_missing_indices() {
    let json = fixture("undefined.fluke");
    assert!(matches!(StoryTemplate::from_json(&json), Err(TemplateError::Json(_))));

    let record = StoryRecord::from_json(&json).unwrap();
    match StoryTemplate::try_from(record) {
        Err(TemplateError::Invalid { missing }) => assert_eq!(missing, set(&[2, 3])),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn scenario_extraction() {
    assert_eq!(required_indices("Hello {1}, you are {2} years old."), set(&[1, 2]));
}

#[test]
fn scenario_missing_prompt() {
    let err = StoryTemplate::new("s", "", map(&[(1, "name")]), "Hi {1} and {2}").unwrap_err();
    assert!(matches!(err, TemplateError::Invalid { missing } if missing == set(&[2])));
}

#[test]
fn scenario_unused_prompt() {
    assert_eq!(unused_input_keys(&set(&[1, 2]), "", "Hi {1}"), set(&[2]));
}

#[test]
fn scenario_trimmed_answer() {
    assert_eq!(substitute(&map(&[(1, "  Bob  ")]), "Hi {1}!").unwrap(), "Hi Bob!");
}

#[test]
fn scenario_first_blank_reported() {
    let err = substitute(&map(&[(1, ""), (2, "x")]), "{1}{2}").unwrap_err();
    assert_eq!(err, SubstitutionError::InputEmpty(PromptIndex(1)));
}

#[test]
fn create_succeeds_iff_required_subset_of_keys() {
    let cases: &[(&str, &str, &[u32], bool)] = &[
        ("", "", &[], true),
        ("{1}", "", &[1], true),
        ("", "{1}{2}", &[1, 2, 3], true),
        ("{4}", "{1}", &[1], false),
        ("", "{0}", &[], false),
        ("{x}", "{ 2 }", &[], true),
    ];
    for (title, body, keys, ok) in cases {
        let inputs: BTreeMap<_, _> = keys.iter().map(|k| (PromptIndex(*k), "p".to_string())).collect();
        let result = StoryTemplate::new("c", *title, inputs, *body);
        assert_eq!(result.is_ok(), *ok, "title={title:?} body={body:?}");
        if let Err(TemplateError::Invalid { missing }) = result {
            let key_set = set(keys);
            let expected: BTreeSet<_> = all_required_indices(title, body)
                .difference(&key_set)
                .copied()
                .collect();
            assert_eq!(missing, expected);
        }
    }
}
