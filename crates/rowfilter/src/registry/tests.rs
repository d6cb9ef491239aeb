//! Tests for the filter registry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::json;

use super::*;
use crate::extract::{FieldTable, FieldValue, SourceAccessor};
use crate::filter::{ListFilter, TextFilter};

type EventLog = Rc<RefCell<Vec<RegistryEvent>>>;

fn recording(registry: &mut FilterRegistry) -> EventLog {
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    registry.subscribe(move |event, _| sink.borrow_mut().push(event.clone()));
    log
}

fn changed(field: &str) -> RegistryEvent {
    RegistryEvent::FilterChanged {
        field: field.to_string(),
    }
}

fn column_changed(field: &str) -> RegistryEvent {
    RegistryEvent::ColumnFilterChanged {
        field: field.to_string(),
    }
}

struct Ticket {
    title: String,
    status: String,
    labels: HashMap<String, String>,
    meta: HashMap<String, HashMap<String, String>>,
}

fn ticket(title: &str, status: &str, team: &str) -> Ticket {
    Ticket {
        title: title.to_string(),
        status: status.to_string(),
        labels: HashMap::from([("team".to_string(), team.to_string())]),
        meta: HashMap::from([(
            "review".to_string(),
            HashMap::from([("owner".to_string(), "Ops".to_string())]),
        )]),
    }
}

fn ticket_table() -> FieldTable<Ticket> {
    FieldTable::new()
        .with("Title", |t: &Ticket| Some(FieldValue::text(&t.title)))
        .with("Status", |t: &Ticket| Some(FieldValue::text(&t.status)))
        .with("Labels", |t: &Ticket| Some(FieldValue::Map(&t.labels)))
        .with("Meta", |t: &Ticket| Some(FieldValue::NestedMap(&t.meta)))
}

// ==================== Mutations and Events ====================

#[test]
fn test_add_filter_notifies() {
    let mut registry = FilterRegistry::new();
    let log = recording(&mut registry);

    registry.add_filter("Status", ListFilter::new(["Open"]));
    registry.add_filter("Status", ListFilter::new(["Open"]));

    assert_eq!(*log.borrow(), vec![changed("Status"), changed("Status")]);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_add_column_filter_builds_filter() {
    let mut registry = FilterRegistry::new();
    let log = recording(&mut registry);

    assert!(registry.add_column_filter("Title", "a|b", FilterKind::Text));
    assert!(registry.add_column_filter("Status", "Open", FilterKind::List));

    assert_eq!(
        *log.borrow(),
        vec![column_changed("Title"), column_changed("Status")]
    );
    assert_eq!(
        registry.get_filter("Status"),
        Some(&Filter::from(ListFilter::single("Open")))
    );
    assert!(registry
        .get_filter("Title")
        .and_then(Filter::as_text)
        .is_some_and(TextFilter::is_macro));
}

#[test]
fn test_add_column_filter_empty_is_noop() {
    let mut registry = FilterRegistry::new();
    registry.add_filter("Title", TextFilter::new("x"));
    let log = recording(&mut registry);

    assert!(!registry.add_column_filter("Title", "", FilterKind::Text));
    assert!(!registry.add_column_filter("Other", "", FilterKind::List));

    assert!(log.borrow().is_empty());
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.display_text("Title"), Some("x".to_string()));
}

#[test]
fn test_remove_filter_always_notifies() {
    let mut registry = FilterRegistry::new();
    registry.add_filter("Title", TextFilter::new("x"));
    let log = recording(&mut registry);

    assert!(registry.remove_filter("Title").is_some());
    assert!(registry.remove_filter("Title").is_none());

    assert_eq!(*log.borrow(), vec![changed("Title"), changed("Title")]);
    assert!(registry.is_empty());
}

#[test]
fn test_clear_filters() {
    let mut registry = FilterRegistry::new();
    registry.add_filter("a", TextFilter::new("x"));
    registry.add_filter("b", TextFilter::new("y"));
    let log = recording(&mut registry);

    registry.clear_filters();

    assert!(registry.is_empty());
    assert_eq!(*log.borrow(), vec![RegistryEvent::Cleared]);
}

#[test]
fn test_load_filters_identical_is_silent() {
    let mut registry = FilterRegistry::new();
    registry.add_filter("a", TextFilter::new("x"));
    let log = recording(&mut registry);

    assert!(!registry.load_filters(registry.snapshot()));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_load_filters_different_notifies_once() {
    let mut registry = FilterRegistry::new();
    registry.add_filter("a", TextFilter::new("x"));
    let log = recording(&mut registry);

    let next = FilterMap::from([
        ("a".to_string(), Filter::from(TextFilter::new("y"))),
        ("b".to_string(), Filter::from(ListFilter::new(["1", "2"]))),
    ]);
    assert!(registry.load_filters(next.clone()));

    assert_eq!(*log.borrow(), vec![RegistryEvent::Reloaded]);
    assert_eq!(registry.filters(), &next);
}

#[test]
fn test_load_filters_empty_into_empty_is_silent() {
    let mut registry = FilterRegistry::new();
    let log = recording(&mut registry);

    assert!(!registry.load_filters(FilterMap::new()));
    assert!(log.borrow().is_empty());
}

// ==================== Observers ====================

#[test]
fn test_observer_sees_completed_mutation() {
    let mut registry = FilterRegistry::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    registry.subscribe(move |_, registry| sink.borrow_mut().push(registry.len()));

    registry.add_filter("a", TextFilter::new("x"));
    registry.add_filter("b", TextFilter::new("y"));
    registry.clear_filters();

    assert_eq!(*seen.borrow(), vec![1, 2, 0]);
}

#[test]
fn test_observer_can_reapply_predicate() {
    let rows = vec![json!({"Name": "Ann"}), json!({"Name": "Bob"})];
    let visible = Rc::new(RefCell::new(0usize));

    let mut registry = FilterRegistry::new();
    let sink = Rc::clone(&visible);
    let view = rows.clone();
    registry.subscribe(move |_, registry| {
        *sink.borrow_mut() = registry.filter_items(&view, &SourceAccessor).len();
    });

    registry.add_column_filter("Name", "ann", FilterKind::Text);
    assert_eq!(*visible.borrow(), 1);

    registry.remove_filter("Name");
    assert_eq!(*visible.borrow(), 2);
}

#[test]
fn test_unsubscribe() {
    let mut registry = FilterRegistry::new();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    let id = registry.subscribe(move |_, _| *sink.borrow_mut() += 1);
    let log = recording(&mut registry);
    assert_eq!(registry.observer_count(), 2);

    registry.clear_filters();
    assert!(registry.unsubscribe(id));
    assert!(!registry.unsubscribe(id));
    registry.clear_filters();

    assert_eq!(*count.borrow(), 1);
    assert_eq!(log.borrow().len(), 2);
    assert_eq!(registry.observer_count(), 1);
}

// ==================== Evaluation ====================

#[test]
fn test_empty_registry_accepts_everything() {
    let registry = FilterRegistry::new();
    assert!(registry.apply_total_filter(&json!({}), &SourceAccessor));
    assert!(registry.apply_total_filter(&json!(null), &SourceAccessor));
}

#[test]
fn test_composite_is_and_of_filters() {
    let mut registry = FilterRegistry::new();
    registry.add_column_filter("Title", "printer", FilterKind::Text);
    registry.add_column_filter("Status", "Open", FilterKind::List);

    let table = ticket_table();
    assert!(registry.apply_total_filter(&ticket("Printer jam", "Open", "it"), &table));
    assert!(!registry.apply_total_filter(&ticket("Printer jam", "Closed", "it"), &table));
    assert!(!registry.apply_total_filter(&ticket("Login", "Open", "it"), &table));
}

#[test]
fn test_missing_field_rejects_everything() {
    let mut registry = FilterRegistry::new();
    registry.add_column_filter("Priority", "high", FilterKind::Text);

    let table = ticket_table();
    assert!(!registry.apply_total_filter(&ticket("a", "Open", "it"), &table));
    assert!(!registry.apply_total_filter(&json!({"Title": "a"}), &SourceAccessor));
}

#[test]
fn test_empty_filters_do_not_restrict() {
    let mut registry = FilterRegistry::new();
    registry.add_filter("Priority", ListFilter::default());
    registry.add_filter("Severity", TextFilter::default());

    assert!(registry.apply_total_filter(&ticket("a", "Open", "it"), &ticket_table()));
}

#[test]
fn test_keyed_path_list_filter_folds_value() {
    let mut registry = FilterRegistry::new();
    registry.add_filter("Labels:team", ListFilter::new(["core"]));

    let table = ticket_table();
    assert!(registry.apply_total_filter(&ticket("a", "Open", "Core"), &table));
    assert!(registry.apply_total_filter(&ticket("a", "Open", "CORE"), &table));
    assert!(!registry.apply_total_filter(&ticket("a", "Open", "ops"), &table));

    // Accepted values are not folded.
    registry.add_filter("Labels:team", ListFilter::new(["Core"]));
    assert!(!registry.apply_total_filter(&ticket("a", "Open", "Core"), &table));
}

#[test]
fn test_direct_path_list_filter_is_exact() {
    let mut registry = FilterRegistry::new();
    registry.add_filter("Status", ListFilter::new(["open"]));

    assert!(!registry.apply_total_filter(&ticket("a", "Open", "it"), &ticket_table()));
}

#[test]
fn test_nested_path() {
    let mut registry = FilterRegistry::new();
    registry.add_column_filter("Meta:review:owner", "\"ops\"", FilterKind::Text);

    let table = ticket_table();
    assert!(registry.apply_total_filter(&ticket("a", "Open", "it"), &table));

    registry.add_column_filter("Meta:review:owner", "\"Ops\"", FilterKind::Text);
    assert!(!registry.apply_total_filter(&ticket("a", "Open", "it"), &table));
}

#[test]
fn test_nested_path_on_json() {
    let mut registry = FilterRegistry::new();
    registry.add_column_filter("Meta:review:owner", "\"*op*\"", FilterKind::Text);

    let hit = json!({"Meta": {"review": {"owner": "DevOps"}}});
    let miss = json!({"Meta": {"review": {"owner": "QA"}}});
    let wrong_shape = json!({"Meta": {"review": "DevOps"}});

    let keep = registry.predicate(&SourceAccessor);
    assert!(keep(&hit));
    assert!(!keep(&miss));
    assert!(!keep(&wrong_shape));
}

#[test]
fn test_filter_items_keeps_order() {
    let mut registry = FilterRegistry::new();
    registry.add_column_filter("Title", "\"\" | \"*jam*\"", FilterKind::Text);

    let rows = vec![
        ticket("Paper jam", "Open", "it"),
        ticket("Login", "Open", "it"),
        ticket("", "Open", "it"),
        ticket("Jam again", "Open", "it"),
    ];
    let titles: Vec<&str> = registry
        .filter_items(&rows, &ticket_table())
        .into_iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Paper jam", "", "Jam again"]);
}

// ==================== JSON ====================

#[test]
fn test_save_and_load_json() {
    let mut registry = FilterRegistry::new();
    registry.add_column_filter("Status", "Open", FilterKind::List);
    registry.add_column_filter("Title", "\"*jam*\" & paper", FilterKind::Text);
    let text = registry.save_json().unwrap();

    let mut restored = FilterRegistry::new();
    let log = recording(&mut restored);
    assert!(restored.load_json(&text).unwrap());
    assert_eq!(restored.filters(), registry.filters());
    assert_eq!(*log.borrow(), vec![RegistryEvent::Reloaded]);

    assert!(!restored.load_json(&text).unwrap());
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_load_json_failure_leaves_registry_untouched() {
    let mut registry = FilterRegistry::new();
    registry.add_filter("a", TextFilter::new("x"));
    let before = registry.snapshot();
    let log = recording(&mut registry);

    assert!(registry.load_json("not json").is_err());
    assert!(registry
        .load_json(r#"{"b": {"FilterType": 2, "Filter": "y"}, "c": {"FilterType": 0}}"#)
        .is_err());

    assert_eq!(registry.filters(), &before);
    assert!(log.borrow().is_empty());
}

// ==================== Reads ====================

#[test]
fn test_display_text() {
    let mut registry = FilterRegistry::new();
    registry.add_filter("Status", ListFilter::new(["Open", "Blocked"]));
    registry.add_filter("Title", TextFilter::new("\"*jam*\""));

    assert_eq!(registry.display_text("Status"), Some("Open, Blocked".to_string()));
    assert_eq!(registry.display_text("Title"), Some("\"*jam*\"".to_string()));
    assert_eq!(registry.display_text("Missing"), None);
}

#[test]
fn test_fields_are_ordered() {
    let registry = FilterRegistry::with_filters(FilterMap::from([
        ("b".to_string(), Filter::create(FilterKind::Text, "1")),
        ("a".to_string(), Filter::create(FilterKind::Text, "2")),
    ]));
    assert_eq!(registry.fields().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(registry.iter().count(), 2);
}

#[test]
fn test_debug_hides_observers() {
    let mut registry = FilterRegistry::new();
    registry.subscribe(|_, _| {});
    let text = format!("{:?}", registry);
    assert!(text.contains("observers: 1"), "{}", text);
}
