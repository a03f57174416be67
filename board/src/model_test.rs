use super::*;

// =============================================================================
// UserId
// =============================================================================

#[test]
fn from_raw_accepts_positive_ids() {
    assert_eq!(UserId::from_raw(1).map(UserId::get), Some(1));
    assert_eq!(UserId::from_raw(42).map(UserId::get), Some(42));
}

#[test]
fn from_raw_maps_zero_and_negative_to_none() {
    assert!(UserId::from_raw(0).is_none());
    assert!(UserId::from_raw(-1).is_none());
    assert!(UserId::from_raw(i64::MIN).is_none());
}

#[test]
fn raw_or_zero_encodes_none_as_zero() {
    assert_eq!(UserId::raw_or_zero(None), 0);
    assert_eq!(UserId::raw_or_zero(UserId::from_raw(7)), 7);
}

#[test]
fn user_id_serializes_as_plain_integer() {
    let id = UserId::from_raw(3).unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), "3");
    assert_eq!(format!("{id}"), "3");
}

// =============================================================================
// RoleState
// =============================================================================

#[test]
fn role_state_default_is_overview_without_leader() {
    let roles = RoleState::default();
    assert!(roles.leader_id.is_none());
    assert!(roles.editor_id.is_none());
    assert!(roles.last_editor_id.is_none());
}

#[test]
fn one_user_may_hold_both_roles() {
    let user = UserId::from_raw(2).unwrap();
    let roles = RoleState { leader_id: Some(user), editor_id: Some(user), last_editor_id: None };
    assert!(roles.is_leader(user));
    assert!(roles.is_editor(user));
}

// =============================================================================
// Deliverable
// =============================================================================

#[test]
fn deliverable_label_matches_banner_format() {
    let d = Deliverable { number: 4, text: "Sprint demo".into() };
    assert_eq!(d.label(), "Deliverable #4: Sprint demo");
}

// =============================================================================
// TimeSpent
// =============================================================================

#[test]
fn time_spent_labels_parse_back() {
    for t in TimeSpent::ALL {
        assert_eq!(TimeSpent::from_label(t.as_str()), t);
    }
}

#[test]
fn time_spent_unknown_label_is_unset() {
    assert_eq!(TimeSpent::from_label("forever"), TimeSpent::Unset);
    assert_eq!(TimeSpent::from_label(" 1:30 "), TimeSpent::OneAndHalf);
}

#[test]
fn time_spent_serializes_as_label() {
    assert_eq!(serde_json::to_string(&TimeSpent::Two).unwrap(), "\"2:00\"");
    assert_eq!(serde_json::to_string(&TimeSpent::Unset).unwrap(), "\"\"");
}

#[test]
fn time_spent_minutes_are_ascending() {
    let minutes: Vec<u32> = TimeSpent::ALL.iter().map(|t| t.minutes()).collect();
    assert!(minutes.windows(2).all(|w| w[0] < w[1]));
}

// =============================================================================
// Item
// =============================================================================

#[test]
fn blank_item_id_is_one_based_row() {
    let user = UserId::from_raw(1).unwrap();
    let item = Item::blank(user, 0);
    assert_eq!(item.id, 1);
    assert_eq!(item.row_index, 0);
    assert!(item.description.is_empty());
    assert_eq!(item.time_spent, TimeSpent::Unset);
}

#[test]
fn pane_kind_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&PaneKind::ItemPane).unwrap(), "\"item_pane\"");
    assert_eq!(serde_json::to_string(&PaneKind::UserRow).unwrap(), "\"user_row\"");
}
