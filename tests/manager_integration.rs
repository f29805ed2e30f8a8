//! Manager-level integration tests.
//!
//! These exercise the crate purely through its public API: windows are
//! touched by id only and observed through the single event subscriber,
//! exactly the way a shell component (taskbar, desktop icons) would.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use cloudflow_wm::{
    EventKind, WindowEvent, WindowId, WindowManager, WindowState, WindowType, WmConfig,
};

/// Helper: subscribe and collect every forwarded event.
fn capture(wm: &mut WindowManager) -> Rc<RefCell<Vec<WindowEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    wm.set_event_callback(move |event: &WindowEvent| sink.borrow_mut().push(event.clone()));
    events
}

// ── Creation and focus ───────────────────────────────────────────

#[test]
fn newest_window_gets_focus() {
    let mut wm = WindowManager::new();

    let a = wm.create_window("A", 800, 600, WindowType::Normal).unwrap();
    assert_eq!(a, WindowId(1));
    assert_eq!(wm.focused_window(), Some(a));

    let b = wm.create_window("B", 400, 300, WindowType::Dialog).unwrap();
    assert_eq!(b, WindowId(2));
    assert_eq!(wm.focused_window(), Some(b));
    assert_eq!(wm.window_count(), 2);
}

#[test]
fn dialog_resize_below_default_minimum_fails() {
    let mut wm = WindowManager::new();
    wm.create_window("A", 800, 600, WindowType::Normal).unwrap();
    let b = wm.create_window("B", 400, 300, WindowType::Dialog).unwrap();

    // Default bounds are 100x100 minimum
    assert!(!wm.resize_window(b, 50, 50));
    let geometry = wm.window_geometry(b).unwrap();
    assert_eq!((geometry.width, geometry.height), (400, 300));

    assert!(wm.resize_window(b, 200, 150));
    assert_eq!(wm.window_geometry(b).unwrap().width, 200);
}

#[test]
fn creation_emits_focus_then_created() {
    let mut wm = WindowManager::new();
    let events = capture(&mut wm);

    let a = wm.create_window("A", 800, 600, WindowType::Normal).unwrap();

    let kinds: Vec<_> = events
        .borrow()
        .iter()
        .map(|e| (e.window_id, e.kind.clone()))
        .collect();
    assert_eq!(kinds, vec![(a, EventKind::FocusGained), (a, EventKind::Created)]);
}

// ── Closing and focus re-arbitration ─────────────────────────────

#[test]
fn closing_focused_window_refocuses_a_survivor() {
    let mut wm = WindowManager::new();
    let a = wm.create_window("A", 800, 600, WindowType::Normal).unwrap();
    let b = wm.create_window("B", 800, 600, WindowType::Normal).unwrap();
    let c = wm.create_window("C", 800, 600, WindowType::Normal).unwrap();
    assert_eq!(wm.focused_window(), Some(c));

    assert!(wm.close_window(c));
    let survivor = wm.focused_window().expect("one survivor must be focused");
    assert!(wm.window_ids().contains(&survivor));
    assert!(survivor == a || survivor == b);
}

#[test]
fn closing_the_last_window_clears_focus() {
    let mut wm = WindowManager::new();
    let a = wm.create_window("A", 800, 600, WindowType::Normal).unwrap();
    assert!(wm.close_window(a));
    assert_eq!(wm.focused_window(), None);
    assert_eq!(wm.window_count(), 0);

    // The freed slot is never reissued
    let b = wm.create_window("B", 640, 480, WindowType::Normal).unwrap();
    assert_eq!(b, WindowId(2));
}

// ── Geometry events ──────────────────────────────────────────────

#[test]
fn second_move_reports_previous_position() {
    let mut wm = WindowManager::new();
    let a = wm.create_window("A", 800, 600, WindowType::Normal).unwrap();
    let events = capture(&mut wm);

    assert!(wm.move_window(a, 10, 20));
    assert!(wm.move_window(a, 30, 40));

    let events = events.borrow();
    assert_eq!(events[0].kind, EventKind::Moved { x: 10, y: 20, old_x: 0, old_y: 0 });
    assert_eq!(events[1].kind, EventKind::Moved { x: 30, y: 40, old_x: 10, old_y: 20 });
}

#[test]
fn maximize_then_restore_round_trips_geometry() {
    let mut wm = WindowManager::new();
    let a = wm.create_window("A", 800, 600, WindowType::Normal).unwrap();
    wm.move_window(a, 120, 80);
    let before = wm.window_geometry(a).unwrap();

    assert!(wm.maximize_window(a));
    assert_eq!(wm.window_state(a), Some(WindowState::Maximized));
    assert_eq!(wm.window_geometry(a).unwrap().width, 1920);

    assert!(wm.restore_window(a));
    assert_eq!(wm.window_state(a), Some(WindowState::Normal));
    assert_eq!(wm.window_geometry(a).unwrap(), before);
}

#[test]
fn minimize_is_visible_through_state_accessor() {
    let mut wm = WindowManager::new();
    let a = wm.create_window("A", 800, 600, WindowType::Normal).unwrap();

    assert!(wm.minimize_window(a));
    assert_eq!(wm.window_state(a), Some(WindowState::Minimized));
    assert!(wm.minimize_window(a)); // idempotent
    assert_eq!(wm.window_state(a), Some(WindowState::Minimized));
}

// ── Event ordering ───────────────────────────────────────────────

#[test]
fn timestamps_increase_across_the_whole_manager() {
    let mut wm = WindowManager::new();
    let events = capture(&mut wm);

    let a = wm.create_window("A", 800, 600, WindowType::Normal).unwrap();
    let b = wm.create_window("B", 800, 600, WindowType::Normal).unwrap();
    wm.move_window(a, 1, 1);
    wm.maximize_window(b);
    wm.set_focus(a);
    wm.close_window(b);

    let events = events.borrow();
    assert!(!events.is_empty());
    assert!(
        events.windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp),
        "timestamps must be strictly increasing: {events:#?}"
    );
}

// ── Persistence ──────────────────────────────────────────────────

#[test]
fn save_restore_round_trips_windows_and_focus() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("windows.json");

    let mut wm = WindowManager::new();
    let a = wm.create_window("Editor", 800, 600, WindowType::Normal).unwrap();
    let b = wm.create_window("Browser", 1024, 768, WindowType::Normal).unwrap();
    wm.move_window(a, 40, 60);
    wm.minimize_window(b);
    wm.set_focus(a);
    assert!(wm.save_window_state(&path));

    let mut restored = WindowManager::new();
    assert!(restored.restore_window_state(&path));

    assert_eq!(restored.window_count(), 2);
    assert_eq!(restored.focused_window(), Some(a));
    assert_eq!(restored.window_title(a), Some("Editor".to_string()));
    let geometry = restored.window_geometry(a).unwrap();
    assert_eq!((geometry.x, geometry.y), (40, 60));
    assert_eq!(restored.window_state(b), Some(WindowState::Minimized));
}

#[test]
fn restored_focus_flag_matches_the_manager() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("windows.json");

    let mut wm = WindowManager::new();
    let a = wm.create_window("Editor", 800, 600, WindowType::Normal).unwrap();
    let b = wm.create_window("Browser", 1024, 768, WindowType::Normal).unwrap();
    wm.set_focus(a);
    assert!(wm.save_window_state(&path));

    let mut restored = WindowManager::new();
    assert!(restored.restore_window_state(&path));

    assert_eq!(restored.focused_window(), Some(a));
    assert_eq!(restored.window_has_focus(a), Some(true));
    assert_eq!(restored.window_has_focus(b), Some(false));

    // The no-op refocus path sees a consistent flag
    assert!(restored.set_focus(a));
    assert_eq!(restored.window_has_focus(a), Some(true));
}

#[test]
fn restored_ids_never_collide_with_new_ones() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("windows.json");

    let mut wm = WindowManager::new();
    for title in ["A", "B", "C"] {
        wm.create_window(title, 640, 480, WindowType::Normal).unwrap();
    }
    assert!(wm.save_window_state(&path));

    let mut restored = WindowManager::new();
    assert!(restored.restore_window_state(&path));
    let next = restored.create_window("D", 640, 480, WindowType::Normal).unwrap();
    assert_eq!(next, WindowId(4));
}

#[test]
fn restore_replaces_the_live_set() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("windows.json");

    let mut wm = WindowManager::new();
    let a = wm.create_window("Keep", 640, 480, WindowType::Normal).unwrap();
    assert!(wm.save_window_state(&path));

    let b = wm.create_window("Dropped by restore", 640, 480, WindowType::Normal).unwrap();
    assert!(wm.restore_window_state(&path));

    assert_eq!(wm.window_ids(), vec![a]);
    assert_eq!(wm.window_geometry(b), None);
    // Counter stays ahead of everything ever issued
    let c = wm.create_window("New", 640, 480, WindowType::Normal).unwrap();
    assert_eq!(c, WindowId(3));
}

#[test]
fn failed_restore_leaves_the_manager_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("windows.json");
    std::fs::write(
        &path,
        r#"{"windows": [{"id": 1, "title": "ok", "x": 0, "y": 0, "width": 300, "height": 300, "state": 0},
                        {"id": 2, "title": "bad", "x": 0, "y": 0, "width": -5, "height": 300, "state": 0}],
            "focused_window": 1}"#,
    )
    .unwrap();

    let mut wm = WindowManager::new();
    let a = wm.create_window("Live", 800, 600, WindowType::Normal).unwrap();

    assert!(!wm.restore_window_state(&path));
    assert_eq!(wm.window_ids(), vec![a]);
    assert_eq!(wm.focused_window(), Some(a));
    assert_eq!(wm.window_title(a), Some("Live".to_string()));
}

#[test]
fn restore_from_missing_file_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let mut wm = WindowManager::new();
    wm.create_window("Live", 800, 600, WindowType::Normal).unwrap();

    assert!(!wm.restore_window_state(dir.path().join("nope.json")));
    assert_eq!(wm.window_count(), 1);
}

#[test]
fn custom_display_bounds_flow_into_maximize() {
    let config: WmConfig = toml::from_str(
        r#"
        [display]
        width = 2560
        height = 1440
        "#,
    )
    .unwrap();
    let mut wm = WindowManager::with_config(config);
    let a = wm.create_window("A", 800, 600, WindowType::Normal).unwrap();

    assert!(wm.maximize_window(a));
    let geometry = wm.window_geometry(a).unwrap();
    assert_eq!((geometry.width, geometry.height), (2560, 1440));
}

// ── Focus invariant under arbitrary operation sequences ──────────

#[derive(Debug, Clone)]
enum Op {
    Create,
    Close(usize),
    Focus(usize),
    CloseUnknown,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Create),
        2 => any::<usize>().prop_map(Op::Close),
        2 => any::<usize>().prop_map(Op::Focus),
        1 => Just(Op::CloseUnknown),
    ]
}

proptest! {
    #[test]
    fn focus_is_always_none_or_a_live_window(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut wm = WindowManager::new();

        for op in ops {
            match op {
                Op::Create => {
                    wm.create_window("w", 640, 480, WindowType::Normal);
                }
                Op::Close(k) => {
                    let mut ids = wm.window_ids();
                    ids.sort_by_key(|id| id.0);
                    if !ids.is_empty() {
                        wm.close_window(ids[k % ids.len()]);
                    }
                }
                Op::Focus(k) => {
                    let mut ids = wm.window_ids();
                    ids.sort_by_key(|id| id.0);
                    if !ids.is_empty() {
                        wm.set_focus(ids[k % ids.len()]);
                    }
                }
                Op::CloseUnknown => {
                    prop_assert!(!wm.close_window(WindowId(u64::MAX)));
                }
            }

            match wm.focused_window() {
                Some(id) => prop_assert!(wm.window_ids().contains(&id)),
                None => prop_assert_eq!(wm.window_count(), 0),
            }
        }
    }
}
