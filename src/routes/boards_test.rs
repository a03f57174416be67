use super::*;
use crate::state::test_helpers::test_app_state;
use board::view::ViewMode;

fn uid(raw: i64) -> UserId {
    UserId::from_raw(raw).unwrap()
}

// =============================================================================
// Error mapping
// =============================================================================

#[test]
fn board_error_to_status_maps_every_kind() {
    assert_eq!(
        board_error_to_status(&BoardError::StoreUnavailable("down".into())),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(board_error_to_status(&BoardError::InvalidRoleTarget(uid(9))), StatusCode::NOT_FOUND);
    assert_eq!(board_error_to_status(&BoardError::LeaderLocked(uid(1))), StatusCode::CONFLICT);
}

#[test]
fn non_positive_path_id_is_not_found() {
    assert_eq!(user_id(0).unwrap_err().status, StatusCode::NOT_FOUND);
    assert_eq!(user_id(-3).unwrap_err().code, "E_INVALID_ROLE_TARGET");
    assert_eq!(user_id(4).unwrap(), uid(4));
}

#[tokio::test]
async fn api_error_body_carries_code_and_message() {
    let err = reject(BoardError::LeaderLocked(uid(1)));
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "E_LEADER_LOCKED");
    assert!(body["error"]["message"].as_str().unwrap().contains('1'));
}

// =============================================================================
// Handlers
// =============================================================================

#[tokio::test]
async fn get_board_drains_startup_events_once() {
    let (state, _store) = test_app_state(&["Ada", "Grace"]).await;

    let first = get_board(State(state.clone())).await;
    let second = get_board(State(state)).await;

    assert!(!first.0.events.is_empty());
    assert!(second.0.events.is_empty());
    assert_eq!(second.0.snapshot.users.len(), 2);
}

#[tokio::test]
async fn claim_leader_updates_snapshot() {
    let (state, store) = test_app_state(&["Ada", "Grace"]).await;

    let Json(resp) = claim_leader(State(state), Path(2)).await.unwrap();

    assert_eq!(resp.snapshot.roles.leader_id, Some(uid(2)));
    assert_eq!(board::SharedStateStore::current_leader_id(&store).await.unwrap(), Some(uid(2)));
}

#[tokio::test]
async fn claim_leader_for_unknown_user_is_404() {
    let (state, _store) = test_app_state(&["Ada"]).await;
    assert_eq!(claim_leader(State(state), Path(7)).await.unwrap_err().status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn focused_user_leader_claim_is_409() {
    let (state, _store) = test_app_state(&["Ada", "Grace"]).await;
    toggle_editor(State(state.clone()), Path(1)).await.unwrap();

    let err = claim_leader(State(state), Path(1)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(err.code, "E_LEADER_LOCKED");
}

#[tokio::test]
async fn toggle_then_resume_round_trip() {
    let (state, _store) = test_app_state(&["Ada", "Grace"]).await;

    let Json(focused) = toggle_editor(State(state.clone()), Path(2)).await.unwrap();
    assert_eq!(focused.snapshot.mode, ViewMode::Focused(uid(2)));

    let Json(overview) = toggle_editor(State(state.clone()), Path(2)).await.unwrap();
    assert_eq!(overview.snapshot.mode, ViewMode::Overview);

    let Json(resumed) = resume_editing(State(state)).await.unwrap();
    assert_eq!(resumed.snapshot.mode, ViewMode::Focused(uid(2)));
}

#[tokio::test]
async fn scroll_pane_reports_broadcast() {
    let (state, _store) = test_app_state(&["Ada", "Grace"]).await;
    get_board(State(state.clone())).await;

    let Json(resp) = scroll_pane(State(state), Path(1), Json(OffsetBody { offset: 120 })).await.unwrap();

    assert_eq!(resp.events, vec![BoardEvent::ScrollBroadcast { pane: uid(1), offset: 120 }]);
    assert!(resp.snapshot.panes.iter().all(|p| p.vertical_offset == 120));
}

#[tokio::test]
async fn window_and_horizontal_offset_are_persisted() {
    let (state, store) = test_app_state(&["Ada"]).await;

    let Json(resp) = set_window(State(state.clone()), Json(WindowBody { maximized: true })).await.unwrap();
    assert!(resp.snapshot.window.maximized);
    assert_eq!(resp.snapshot.panes[0].total_rows, 20);

    scroll_horizontal(State(state), Json(OffsetBody { offset: 64 })).await.unwrap();
    assert_eq!(board::SharedStateStore::horizontal_scroll_offset(&store).await.unwrap(), 64);
    assert!(board::SharedStateStore::window_maximized(&store).await.unwrap());
}

#[tokio::test]
async fn load_more_and_resize_grow_panes() {
    let (state, _store) = test_app_state(&["Ada"]).await;

    let Json(resp) = load_more(State(state.clone()), Path(1)).await.unwrap();
    assert_eq!(resp.snapshot.panes[0].total_rows, 8);

    let Json(resp) = resize(State(state)).await.unwrap();
    assert_eq!(resp.snapshot.panes[0].total_rows, 8);
}

#[tokio::test]
async fn store_outage_is_503_until_refresh_succeeds() {
    let (state, store) = test_app_state(&["Ada"]).await;
    store.set_available(false);

    assert_eq!(toggle_editor(State(state.clone()), Path(1)).await.unwrap_err().status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(refresh(State(state.clone())).await.unwrap_err().status, StatusCode::SERVICE_UNAVAILABLE);

    let Json(degraded) = get_board(State(state.clone())).await;
    assert!(degraded.snapshot.users.is_empty());
    assert!(degraded.events.iter().any(|e| matches!(e, BoardEvent::StoreUnavailable { .. })));

    store.set_available(true);
    let Json(recovered) = refresh(State(state)).await.unwrap();
    assert_eq!(recovered.snapshot.users.len(), 1);
}
