use super::*;

fn uid(raw: i64) -> UserId {
    UserId::from_raw(raw).unwrap()
}

fn coordinator(count: i64) -> ViewCoordinator {
    ViewCoordinator::new((1..=count).map(uid).collect())
}

// =============================================================================
// Overview
// =============================================================================

#[test]
fn starts_in_overview_with_everything_visible() {
    let view = coordinator(3);
    assert_eq!(view.mode(), ViewMode::Overview);
    for user in view.users() {
        for kind in PaneKind::ALL {
            assert!(view.is_visible(kind, *user));
        }
    }
    assert_eq!(view.visible_panes(), vec![uid(1), uid(2), uid(3)]);
}

#[test]
fn overview_enables_every_control() {
    let view = coordinator(2);
    let roles = RoleState { leader_id: Some(uid(2)), ..RoleState::default() };
    let controls = view.controls(uid(2), &roles);
    assert!(controls.is_leader);
    assert!(controls.leader_enabled);
    assert!(controls.edit_enabled);
    assert!(!controls.edit_active);
}

// =============================================================================
// Focused
// =============================================================================

#[test]
fn focus_hides_every_other_user() {
    let mut view = coordinator(4);
    assert_eq!(view.focus(uid(2)), Some(RefreshScope::Pane(uid(2))));

    for user in view.users() {
        for kind in PaneKind::ALL {
            assert_eq!(view.is_visible(kind, *user), *user == uid(2), "{kind:?} of {user}");
        }
    }
    assert_eq!(view.visible_panes(), vec![uid(2)]);
}

#[test]
fn focused_user_leader_control_is_disabled() {
    let mut view = coordinator(2);
    let roles = RoleState { leader_id: Some(uid(1)), editor_id: Some(uid(1)), last_editor_id: None };
    view.focus(uid(1));

    let controls = view.controls(uid(1), &roles);
    assert!(controls.is_leader);
    assert!(!controls.leader_enabled);
    assert!(controls.edit_enabled);
    assert!(controls.edit_active);

    let hidden = view.controls(uid(2), &roles);
    assert!(!hidden.leader_enabled);
    assert!(!hidden.edit_enabled);
}

#[test]
fn release_restores_leader_control() {
    let mut view = coordinator(2);
    view.focus(uid(1));
    assert!(!view.leader_enabled(uid(1)));

    assert_eq!(view.release(), Some((uid(1), RefreshScope::All)));
    assert!(view.leader_enabled(uid(1)));
    assert_eq!(view.mode(), ViewMode::Overview);
}

#[test]
fn focus_same_user_twice_reports_nothing() {
    let mut view = coordinator(2);
    view.focus(uid(1));
    assert_eq!(view.focus(uid(1)), None);
}

#[test]
fn release_in_overview_is_none() {
    let mut view = coordinator(2);
    assert_eq!(view.release(), None);
}

// =============================================================================
// reconcile
// =============================================================================

#[test]
fn reconcile_none_returns_to_overview() {
    let mut view = coordinator(3);
    view.focus(uid(3));
    assert_eq!(view.reconcile(None), Some(RefreshScope::All));
    assert!(view.mode().is_overview());
}

#[test]
fn reconcile_follows_shared_editor() {
    let mut view = coordinator(3);
    assert_eq!(view.reconcile(Some(uid(2))), Some(RefreshScope::Pane(uid(2))));
    assert_eq!(view.mode(), ViewMode::Focused(uid(2)));
    assert_eq!(view.reconcile(Some(uid(3))), Some(RefreshScope::Pane(uid(3))));
}

#[test]
fn reconcile_matching_state_is_noop() {
    let mut view = coordinator(3);
    assert_eq!(view.reconcile(None), None);
    view.focus(uid(1));
    assert_eq!(view.reconcile(Some(uid(1))), None);
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn view_mode_serializes_tagged() {
    let json = serde_json::to_value(ViewMode::Focused(uid(4))).unwrap();
    assert_eq!(json, serde_json::json!({"mode": "focused", "user_id": 4}));
    let json = serde_json::to_value(ViewMode::Overview).unwrap();
    assert_eq!(json, serde_json::json!({"mode": "overview"}));
}
