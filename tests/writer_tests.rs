use mock_pilot::{
    dom::{Document, EventKind},
    form::{
        extractor::extract_fields,
        field_model::{FieldValue, GeneratedValues},
        writer::{ControlKind, apply_values, positional_index, resolve_target},
    },
};

mod common;

use crate::common::fixtures::{by_id, listen, load_fixture};

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn resolves_by_id_then_name_then_position() {
    let doc = Document::parse(
        r#"<input id="field-1" name="a">
           <input name="field-0">
           <input>"#,
    );
    let controls: Vec<_> = doc.descendant_elements(doc.root(), "input").collect();

    assert_eq!(resolve_target(&doc, "field-1"), Some(controls[0]), "DOM id first");
    assert_eq!(resolve_target(&doc, "field-0"), Some(controls[1]), "name before position");
    assert_eq!(resolve_target(&doc, "field-2"), Some(controls[2]));
    assert_eq!(resolve_target(&doc, "field-3"), None);
    assert_eq!(resolve_target(&doc, "a"), Some(controls[0]));
}

#[test]
fn positional_ids_must_be_exact() {
    assert_eq!(positional_index("field-0"), Some(0));
    assert_eq!(positional_index("field-12"), Some(12));
    assert_eq!(positional_index("field-"), None);
    assert_eq!(positional_index("field-1a"), None);
    assert_eq!(positional_index("field--1"), None);
    assert_eq!(positional_index("my-field-1"), None);
}

#[test]
fn control_kind_is_decided_by_tag_and_type() {
    let doc = Document::parse(
        "<input id=t><input id=c type=CHECKBOX><input id=r type=radio><select id=s></select><textarea id=a></textarea><div id=d></div>",
    );
    assert_eq!(ControlKind::of(&doc, by_id(&doc, "t")), Some(ControlKind::TextInput));
    assert_eq!(ControlKind::of(&doc, by_id(&doc, "c")), Some(ControlKind::CheckInput));
    assert_eq!(ControlKind::of(&doc, by_id(&doc, "r")), Some(ControlKind::CheckInput));
    assert_eq!(ControlKind::of(&doc, by_id(&doc, "s")), Some(ControlKind::Select));
    assert_eq!(ControlKind::of(&doc, by_id(&doc, "a")), Some(ControlKind::TextArea));
    assert_eq!(ControlKind::of(&doc, by_id(&doc, "d")), None);
}

// ============================================================================
// Assignment
// ============================================================================

#[test]
fn text_values_round_trip_for_every_text_like_control() {
    let mut doc = load_fixture("signup.html");
    let fields = extract_fields(&doc);
    let values: GeneratedValues = fields
        .iter()
        .filter(|f| !f.is_checkable() && f.field_type != "select")
        .map(|f| (f.id.clone(), format!("value for {}", f.id)))
        .collect();

    let report = apply_values(&mut doc, &values);
    assert!(report.skipped.is_empty());

    for (id, value) in values.iter() {
        let node = resolve_target(&doc, id).unwrap();
        assert_eq!(doc.value(node), value.as_text(), "field {}", id);
    }
}

#[test]
fn boolean_values_become_text_in_text_inputs() {
    let mut doc = Document::parse("<input id=a>");
    let values: GeneratedValues = [("a", true)].into_iter().collect();

    apply_values(&mut doc, &values);
    assert_eq!(doc.value(by_id(&doc, "a")), "true");
}

#[test]
fn checkbox_accepts_booleans_and_boolean_strings() {
    let mut doc = Document::parse("<input type=checkbox id=a><input type=checkbox id=b checked>");
    let values: GeneratedValues = [
        ("a", FieldValue::Bool(true)),
        ("b", FieldValue::from("false")),
    ]
    .into_iter()
    .collect();

    apply_values(&mut doc, &values);

    assert!(doc.checked(by_id(&doc, "a")));
    assert!(!doc.checked(by_id(&doc, "b")));
}

#[test]
fn checkbox_compares_other_strings_with_its_value() {
    let mut doc = Document::parse(
        "<input type=checkbox id=a><input type=checkbox id=b value=yes><input type=checkbox id=c checked>",
    );
    let values: GeneratedValues = [("a", "on"), ("b", "no"), ("c", "True")].into_iter().collect();

    apply_values(&mut doc, &values);

    assert!(doc.checked(by_id(&doc, "a")), "default value is 'on'");
    assert!(!doc.checked(by_id(&doc, "b")));
    assert!(!doc.checked(by_id(&doc, "c")), "'True' is not a boolean string");
}

#[test]
fn radio_group_by_shared_name_checks_matching_value() {
    let mut doc = Document::parse(
        r#"<form>
             <input type=radio name=size value=s id=s>
             <input type=radio name=size value=m id=m checked>
             <input type=radio name=size value=l id=l>
           </form>"#,
    );
    // Keyed by name: resolves to the first radio of the group.
    let values: GeneratedValues = [("size", "s")].into_iter().collect();
    apply_values(&mut doc, &values);

    assert!(doc.checked(by_id(&doc, "s")));
    assert!(!doc.checked(by_id(&doc, "m")));
    assert!(!doc.checked(by_id(&doc, "l")));
}

#[test]
fn radio_option_value_checks_exactly_that_radio() {
    let mut doc = load_fixture("survey.html");
    let values: GeneratedValues = [
        ("src-search", "ad"),
        ("src-friend", "ad"),
        ("src-ad", "ad"),
    ]
    .into_iter()
    .collect();

    apply_values(&mut doc, &values);

    assert!(!doc.checked(by_id(&doc, "src-search")));
    assert!(!doc.checked(by_id(&doc, "src-friend")));
    assert!(doc.checked(by_id(&doc, "src-ad")));
}

#[test]
fn select_takes_matching_option_or_none() {
    let mut doc = load_fixture("signup.html");
    let plan = resolve_target(&doc, "plan").unwrap();

    apply_values(&mut doc, &[("plan", "pro")].into_iter().collect());
    assert_eq!(doc.value(plan), "pro");

    apply_values(&mut doc, &[("plan", "Enterprise")].into_iter().collect());
    assert_eq!(doc.selected_option(plan), None);
    assert_eq!(doc.value(plan), "");
}

#[test]
fn positional_key_fills_anonymous_controls() {
    let mut doc = load_fixture("survey.html");
    let fields = extract_fields(&doc);
    assert_eq!(fields[3].id, "field-3");
    assert_eq!(fields[4].id, "field-4");

    let values: GeneratedValues = [("field-3", "Ada"), ("field-4", "36"), ("field-5", "Hello")]
        .into_iter()
        .collect();
    apply_values(&mut doc, &values);

    let controls: Vec<_> = doc
        .descendants(doc.root())
        .filter(|&n| matches!(doc.tag_name(n), Some("input") | Some("textarea")))
        .collect();
    assert_eq!(doc.value(controls[3]), "Ada");
    assert_eq!(doc.value(controls[4]), "36");
    assert_eq!(doc.value(controls[5]), "Hello");
}

#[test]
fn numbers_from_json_fill_as_text() {
    let mut doc = load_fixture("survey.html");
    let values = GeneratedValues::from_json_object(&serde_json::json!({ "field-4": 36 })).unwrap();

    apply_values(&mut doc, &values);

    let fields = extract_fields(&doc);
    assert_eq!(fields[4].field_type, "number");
    let node = resolve_target(&doc, "field-4").unwrap();
    assert_eq!(doc.value(node), "36");
}

// ============================================================================
// Events and reporting
// ============================================================================

#[test]
fn contact_scenario_sets_value_and_fires_input_then_change() {
    let mut doc = load_fixture("contact.html");
    let email = by_id(&doc, "email");
    let body = doc.body().unwrap();
    let at_email = listen(&mut doc, email);
    let at_body = listen(&mut doc, body);

    let values: GeneratedValues = [("email", "a@b.com")].into_iter().collect();
    let report = apply_values(&mut doc, &values);

    assert_eq!(report.applied, vec!["email".to_string()]);
    assert_eq!(doc.value(email), "a@b.com");

    let expected = vec![format!("input@{}", email), format!("change@{}", email)];
    assert_eq!(*at_email.lock().unwrap(), expected);
    assert_eq!(*at_body.lock().unwrap(), expected, "events bubble");

    let kinds: Vec<EventKind> = doc.dispatched_events().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::Input, EventKind::Change]);
    assert!(doc.dispatched_events().iter().all(|e| e.bubbles));
}

#[test]
fn unresolved_ids_are_skipped_without_events() {
    let mut doc = load_fixture("contact.html");
    let values: GeneratedValues = [("email", "a@b.com"), ("nope", "x"), ("field-9", "y")]
        .into_iter()
        .collect();

    let report = apply_values(&mut doc, &values);

    assert_eq!(report.applied, vec!["email".to_string()]);
    assert_eq!(report.skipped, vec!["nope".to_string(), "field-9".to_string()]);
    assert_eq!(doc.dispatched_events().len(), 2);
}

#[test]
fn non_control_element_is_untouched_but_still_notified() {
    let mut doc = Document::parse("<div id=note>Keep me</div>");
    let note = by_id(&doc, "note");
    let seen = listen(&mut doc, note);

    apply_values(&mut doc, &[("note", "changed")].into_iter().collect());

    assert_eq!(doc.text_content(note), "Keep me");
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn empty_value_map_changes_nothing() {
    let mut doc = load_fixture("signup.html");
    let report = apply_values(&mut doc, &GeneratedValues::new());

    assert!(report.applied.is_empty());
    assert!(report.skipped.is_empty());
    assert!(doc.dispatched_events().is_empty());
}
