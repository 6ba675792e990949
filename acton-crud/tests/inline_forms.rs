//! Integration tests for inline form binding
//!
//! Exercises the full construct, validate, populate cycle through the public
//! API with a parent/child schema pair.

use std::sync::Arc;

use acton_crud::prelude::*;

fn parent_schema() -> Arc<EntitySchema> {
    EntitySchema::builder("Parent")
        .field("id:integer:pk")
        .field("name:string:required")
        .relationship("children", "Child")
        .build()
        .unwrap()
}

fn child_schema() -> Arc<EntitySchema> {
    EntitySchema::builder("Child")
        .field("id:integer:pk")
        .field("parent_id:references:Parent")
        .field("text:string")
        .field("rank:integer:optional")
        .relationship("toys", "Toy")
        .build()
        .unwrap()
}

fn toy_schema() -> Arc<EntitySchema> {
    EntitySchema::builder("Toy")
        .field("id:integer:pk")
        .field("child_id:references:Child")
        .field("label:string")
        .build()
        .unwrap()
}

fn parent_form() -> Arc<FormSpec> {
    let child = FormSpec::builder(child_schema()).build().unwrap();
    FormSpec::builder(parent_schema())
        .inline(InlineSpec::new(child).extra(1))
        .build()
        .unwrap()
}

fn nested_form() -> Arc<FormSpec> {
    let toy = FormSpec::builder(toy_schema()).build().unwrap();
    let child = FormSpec::builder(child_schema())
        .inline(InlineSpec::new(toy))
        .build()
        .unwrap();
    FormSpec::builder(parent_schema())
        .inline(InlineSpec::new(child))
        .build()
        .unwrap()
}

fn texts(record: &Record) -> Vec<Option<String>> {
    record
        .children("children")
        .unwrap()
        .iter()
        .map(|child| child.get("text").and_then(Value::as_str).map(ToString::to_string))
        .collect()
}

#[test]
fn test_acme_submission_creates_children_in_order() {
    let posted = PostedData::from_pairs([
        ("name", "Acme"),
        ("child_count", "2"),
        ("child_0_text", "a"),
        ("child_1_text", "b"),
    ]);
    let mut form = ModelForm::new(&parent_form(), FormInit::new().posted(&posted)).unwrap();
    assert!(form.validate());

    let mut parent = Record::new(parent_schema());
    form.populate_obj(&mut parent).unwrap();

    assert_eq!(parent.get("name"), Some(&Value::from("Acme")));
    assert_eq!(texts(&parent), [Some("a".to_string()), Some("b".to_string())]);
    assert!(parent
        .children("children")
        .unwrap()
        .iter()
        .all(Record::is_transient));
}

#[test]
fn test_edit_existing_children_in_place() {
    let mut parent = Record::new(parent_schema())
        .with("id", 1)
        .unwrap()
        .with("name", "Acme")
        .unwrap();
    for (id, text) in [(10, "a"), (11, "b")] {
        let child = Record::new(child_schema())
            .with("id", id)
            .unwrap()
            .with("text", text)
            .unwrap();
        parent.attach("children", child).unwrap();
    }

    let form = ModelForm::new(&parent_form(), FormInit::new().object(&parent)).unwrap();
    let set = form.inline("child").unwrap();
    assert_eq!(set.len(), 2);
    assert!(set.iter().all(|(_, is_new)| !is_new));
    assert_eq!(form.primary_keys().unwrap(), [("id".to_string(), Some(Value::Integer(1)))]);

    let blanks = set.blank_rows().unwrap();
    assert_eq!(blanks.len(), 1);
    assert_eq!(blanks[0].field("text").unwrap().key(), "child_2_text");

    let snapshot = parent.clone();
    let mut form = ModelForm::new(&parent_form(), FormInit::new().object(&snapshot)).unwrap();
    form.populate_obj(&mut parent).unwrap();
    assert_eq!(parent, snapshot);
}

#[test]
fn test_resubmitted_rows_are_appended_as_new() {
    let mut parent = Record::new(parent_schema())
        .with("id", 1)
        .unwrap()
        .with("name", "Acme")
        .unwrap();
    parent
        .attach(
            "children",
            Record::new(child_schema()).with("id", 10).unwrap().with("text", "a").unwrap(),
        )
        .unwrap();

    let posted = PostedData::from_pairs([
        ("name", "Acme Corp"),
        ("child_count", "1"),
        ("child_0_id", "10"),
        ("child_0_text", "changed"),
    ]);
    let mut form = ModelForm::new(
        &parent_form(),
        FormInit::new().posted(&posted).object(&parent),
    )
    .unwrap();
    let set = form.inline("child").unwrap();
    assert!(set.rows()[0].is_new());
    assert_eq!(
        set.posted_primary_keys(&posted, 0),
        [("id".to_string(), Some("10".to_string()))]
    );

    form.populate_obj(&mut parent).unwrap();
    assert_eq!(parent.get("name"), Some(&Value::from("Acme Corp")));
    assert_eq!(
        texts(&parent),
        [Some("a".to_string()), Some("changed".to_string())]
    );
}

#[test]
fn test_invalid_rows_report_prefixed_keys() {
    let posted = PostedData::from_pairs([
        ("name", ""),
        ("child_count", "2"),
        ("child_0_text", "a"),
        ("child_0_rank", "first"),
        ("child_1_text", "b"),
        ("child_1_rank", ""),
    ]);
    let mut form = ModelForm::new(&parent_form(), FormInit::new().posted(&posted)).unwrap();

    assert!(!form.validate());
    assert_eq!(
        form.errors().fields_with_errors(),
        vec!["child_0_rank", "name"]
    );
    assert_eq!(
        form.field("name").unwrap().errors()[0].code.as_deref(),
        Some("required")
    );
    let rank = form.inline("child").unwrap().rows()[0]
        .form()
        .field("rank")
        .unwrap()
        .display_value();
    assert_eq!(rank, "first");
}

#[test]
fn test_nested_inlines_compose_prefixes() {
    let posted = PostedData::from_pairs([
        ("name", "Acme"),
        ("child_count", "1"),
        ("child_0_text", "a"),
        ("child_0_toy_count", "2"),
        ("child_0_toy_0_label", "ball"),
        ("child_0_toy_1_label", "kite"),
    ]);
    let mut form = ModelForm::new(&nested_form(), FormInit::new().posted(&posted)).unwrap();
    assert!(form.validate());

    let toys = form.inline("child").unwrap().rows()[0].form().inline("toy").unwrap();
    assert_eq!(toys.count_key(), "child_0_toy_count");
    assert_eq!(toys.len(), 2);

    let mut parent = Record::new(parent_schema());
    form.populate_obj(&mut parent).unwrap();
    let child = &parent.children("children").unwrap()[0];
    let labels: Vec<_> = child
        .children("toys")
        .unwrap()
        .iter()
        .map(|toy| toy.get("label").and_then(Value::as_str))
        .collect();
    assert_eq!(labels, [Some("ball"), Some("kite")]);
}

#[test]
fn test_ambiguous_relationship_needs_explicit_name() {
    let parent = EntitySchema::builder("Parent")
        .field("id:integer:pk")
        .relationship("children", "Child")
        .relationship("favorites", "Child")
        .build()
        .unwrap();
    let child = FormSpec::builder(child_schema()).build().unwrap();

    let err = FormSpec::builder(Arc::clone(&parent))
        .inline(InlineSpec::new(Arc::clone(&child)))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        CrudError::Resolution(ResolutionError::Ambiguous { ref candidates, .. })
            if candidates == &["children".to_string(), "favorites".to_string()]
    ));

    let spec = FormSpec::builder(parent)
        .inline(InlineSpec::new(child).relationship_name("favorites"))
        .build()
        .unwrap();
    assert_eq!(spec.inlines()[0].relationship(), "favorites");
}

#[test]
fn test_settings_change_key_spelling() {
    let settings = FormSettings {
        key_separator: "-".to_string(),
        count_suffix: "total".to_string(),
        ..FormSettings::default()
    };
    let child = FormSpec::builder(child_schema()).build().unwrap();
    let spec = FormSpec::builder(parent_schema())
        .settings(&settings)
        .inline(InlineSpec::new(child))
        .build()
        .unwrap();

    let posted = PostedData::from_pairs([
        ("name", "Acme"),
        ("child-total", "1"),
        ("child-0-text", "a"),
    ]);
    let mut form = ModelForm::new(&spec, FormInit::new().posted(&posted)).unwrap();
    let mut parent = Record::new(parent_schema());
    form.populate_obj(&mut parent).unwrap();
    assert_eq!(texts(&parent), [Some("a".to_string())]);
}

#[test]
fn test_oversized_row_count_fails_validation() {
    let posted = PostedData::from_pairs([
        ("name", "Acme"),
        ("child_count", "18446744073709551615"),
        ("child_0_text", "a"),
    ]);
    let mut form = ModelForm::new(&parent_form(), FormInit::new().posted(&posted)).unwrap();

    assert!(form.inline("child").unwrap().is_empty());
    assert!(!form.validate());
    assert_eq!(form.errors().fields_with_errors(), vec!["child_count"]);
}

#[test]
fn test_unchecked_checkbox_clears_flag_on_edit() {
    let schema = EntitySchema::builder("Account")
        .field("id:integer:pk")
        .field("name:string")
        .field("active:boolean")
        .build()
        .unwrap();
    let spec = FormSpec::builder(Arc::clone(&schema)).build().unwrap();
    let mut record = Record::new(schema)
        .with("id", 1)
        .unwrap()
        .with("active", true)
        .unwrap();

    let posted = PostedData::from_pairs([("name", "Acme")]);
    let mut form =
        ModelForm::new(&spec, FormInit::new().posted(&posted).object(&record)).unwrap();
    assert!(form.validate());
    form.populate_obj(&mut record).unwrap();

    assert_eq!(record.get("active"), Some(&Value::Boolean(false)));
}
