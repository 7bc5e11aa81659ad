//! Integration tests: history through the builder store (pb-editor).
//!
//! Every committed mutation is one undo step; undo/redo restore exact
//! snapshots; gestures coalesce; cancelled gestures leave no trace.

use pb_core::id::NodeId;
use pb_core::model::*;
use pb_editor::{BuilderStore, EditorConfig, StoreEvent};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn append(store: &mut BuilderStore, new: NewNode, parent: NodeId) -> NodeId {
    let end = store.tree().child_ids(parent).len();
    store.insert(new, parent, end).unwrap()
}

fn styles(pairs: &[(&str, &str)]) -> StyleMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ─── Scenario ────────────────────────────────────────────────────────────

#[test]
fn section_button_duplicate_remove_undo() {
    let mut store = BuilderStore::default();
    let root = store.tree().root();

    let s1 = append(&mut store, NewNode::new(ComponentType::Section), root);
    let b1 = append(
        &mut store,
        NewNode::new(ComponentType::Button).prop("text", "Go"),
        s1,
    );
    let s2 = store.duplicate(s1).unwrap();
    assert_eq!(store.tree().child_ids(root), &[s1, s2]);
    let b2 = store.tree().child_ids(s2)[0];
    assert_ne!(b1, b2);
    assert_eq!(store.tree().get(b2).unwrap().prop_str("text"), Some("Go"));

    store.remove(s1).unwrap();
    assert_eq!(store.tree().child_ids(root), &[s2]);

    assert!(store.undo());
    assert_eq!(store.tree().child_ids(root), &[s1, s2]);
    assert_eq!(store.tree().child_ids(s1), &[b1]);

    assert!(store.undo());
    assert_eq!(store.tree().child_ids(root), &[s1]);

    assert!(store.redo());
    assert!(store.redo());
    assert_eq!(store.tree().child_ids(root), &[s2]);
    assert!(!store.redo());
}

// ─── Inverse law ─────────────────────────────────────────────────────────

#[test]
fn undo_walks_back_through_every_snapshot() {
    let mut store = BuilderStore::default();
    let root = store.tree().root();
    let mut snapshots = vec![store.tree().clone()];

    let hero = append(&mut store, NewNode::new(ComponentType::Hero), root);
    snapshots.push(store.tree().clone());
    let title = append(&mut store, NewNode::new(ComponentType::Heading), hero);
    snapshots.push(store.tree().clone());
    store
        .update_props(title, Props::from([("text".to_string(), json!("Hi"))]))
        .unwrap();
    snapshots.push(store.tree().clone());
    store.rename(hero, "Banner").unwrap();
    snapshots.push(store.tree().clone());
    let card = append(&mut store, NewNode::new(ComponentType::Card), root);
    snapshots.push(store.tree().clone());
    store.move_node(title, card, 0).unwrap();
    snapshots.push(store.tree().clone());

    assert_eq!(store.history().len(), snapshots.len());
    for expected in snapshots.iter().rev().skip(1) {
        assert!(store.undo());
        assert_eq!(store.tree(), expected);
    }
    assert!(!store.undo());

    for expected in snapshots.iter().skip(1) {
        assert!(store.redo());
        assert_eq!(store.tree(), expected);
    }
}

#[test]
fn new_commit_after_undo_drops_redo_branch() {
    let mut store = BuilderStore::default();
    let root = store.tree().root();
    let a = append(&mut store, NewNode::new(ComponentType::Section), root);
    append(&mut store, NewNode::new(ComponentType::Footer), root);

    store.undo();
    assert!(store.history().can_redo());
    store.rename(a, "Intro").unwrap();

    assert!(!store.history().can_redo());
    assert_eq!(
        store.history().labels().collect::<Vec<_>>(),
        vec!["open", "insert section", "rename"]
    );
    assert_eq!(store.tree().child_ids(root), &[a]);
}

#[test]
fn no_op_mutations_leave_history_alone() {
    let mut store = BuilderStore::default();
    let root = store.tree().root();
    let a = append(&mut store, NewNode::new(ComponentType::Section), root);
    let len = store.history().len();

    assert_eq!(store.rename(a, "Section"), Ok(false));
    assert_eq!(store.move_node(a, root, 0), Ok(false));
    assert_eq!(store.send_backward(a), Ok(false));
    assert_eq!(store.set_hidden(a, false), Ok(false));
    assert!(store.remove(root).is_err());
    assert_eq!(store.history().len(), len);
}

#[test]
fn history_limit_trims_oldest() {
    let config = EditorConfig {
        history_limit: 5,
        ..EditorConfig::default()
    };
    let mut store = BuilderStore::new(config);
    let root = store.tree().root();
    for _ in 0..10 {
        append(&mut store, NewNode::new(ComponentType::Text), root);
    }
    assert_eq!(store.history().len(), 5);

    let mut undone = 0;
    while store.undo() {
        undone += 1;
    }
    assert_eq!(undone, 4);
    assert_eq!(store.tree().child_ids(root).len(), 6);
}

// ─── Gestures ────────────────────────────────────────────────────────────

#[test]
fn gesture_coalesces_into_one_entry() {
    let mut store = BuilderStore::default();
    let root = store.tree().root();
    let box_id = append(&mut store, NewNode::new(ComponentType::Container), root);
    let before = store.tree().clone();
    let len = store.history().len();

    store.begin_gesture("resize");
    for w in ["100px", "140px", "180px"] {
        store.update_styles(box_id, styles(&[("width", w)])).unwrap();
    }
    assert!(store.end_gesture());

    assert_eq!(store.history().len(), len + 1);
    assert_eq!(store.history().undo_label(), Some("resize"));
    assert_eq!(
        store.tree().get(box_id).unwrap().styles.get("width").map(String::as_str),
        Some("180px")
    );

    store.undo();
    assert_eq!(store.tree(), &before);
}

#[test]
fn cancelled_gesture_restores_and_records_nothing() {
    let mut store = BuilderStore::default();
    let root = store.tree().root();
    let box_id = append(&mut store, NewNode::new(ComponentType::Container), root);
    let before = store.tree().clone();
    let len = store.history().len();

    store.begin_gesture("drag color");
    store
        .update_styles(box_id, styles(&[("color", "#111")]))
        .unwrap();
    store
        .update_styles(box_id, styles(&[("color", "#222")]))
        .unwrap();
    assert!(store.cancel_gesture());

    assert_eq!(store.tree(), &before);
    assert_eq!(store.history().len(), len);
    assert!(!store.history().can_redo());
}

#[test]
fn empty_gesture_leaves_no_entry() {
    let mut store = BuilderStore::default();
    let len = store.history().len();
    store.begin_gesture("noop");
    assert!(!store.end_gesture());
    assert_eq!(store.history().len(), len);
    assert!(!store.cancel_gesture());
}

#[test]
fn structural_edit_closes_open_gesture() {
    let mut store = BuilderStore::default();
    let root = store.tree().root();
    let box_id = append(&mut store, NewNode::new(ComponentType::Container), root);
    let len = store.history().len();

    store.begin_gesture("tweak");
    store.rename(box_id, "Box").unwrap();
    append(&mut store, NewNode::new(ComponentType::Text), box_id);
    store.rename(box_id, "Box 2").unwrap();

    assert!(!store.history().in_gesture());
    assert_eq!(store.history().len(), len + 3);
    assert!(!store.end_gesture());
}

// ─── Notifications ───────────────────────────────────────────────────────

#[test]
fn undo_redo_notify_history_moves() {
    let mut store = BuilderStore::default();
    let root = store.tree().root();
    let a = append(&mut store, NewNode::new(ComponentType::Section), root);
    store.select(Some(a), false).unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |e| sink.borrow_mut().push(e.clone()));

    store.undo();
    assert!(store.selection().is_empty());
    store.redo();
    assert_eq!(
        *events.borrow(),
        vec![
            StoreEvent::HistoryMoved { index: 0 },
            StoreEvent::SelectionChanged,
            StoreEvent::HistoryMoved { index: 1 },
        ]
    );
}
