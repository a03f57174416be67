//! Board session routes.

#[cfg(test)]
#[path = "boards_test.rs"]
mod boards_test;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use board::error::ErrorCode;
use board::{BoardError, BoardEvent, BoardSnapshot, Session, UserId};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub snapshot: BoardSnapshot,
    pub events: Vec<BoardEvent>,
}

#[derive(Debug, Deserialize)]
pub struct OffsetBody {
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub struct WindowBody {
    pub maximized: bool,
}

/// Failed board request: HTTP status plus the `E_*` code, serialized as
/// `{"error": {"code", "message"}}`.
#[derive(Debug, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": { "code": self.code, "message": self.message } });
        (self.status, Json(body)).into_response()
    }
}

type BoardResult = Result<Json<BoardResponse>, ApiError>;

fn respond(session: &mut Session) -> Json<BoardResponse> {
    Json(BoardResponse { snapshot: session.snapshot(), events: session.take_events() })
}

fn user_id(raw: i64) -> Result<UserId, ApiError> {
    UserId::from_raw(raw).ok_or_else(|| ApiError {
        status: StatusCode::NOT_FOUND,
        code: "E_INVALID_ROLE_TARGET",
        message: format!("no such user: {raw}"),
    })
}

pub(crate) fn board_error_to_status(err: &BoardError) -> StatusCode {
    match err {
        BoardError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        BoardError::InvalidRoleTarget(_) => StatusCode::NOT_FOUND,
        BoardError::LeaderLocked(_) => StatusCode::CONFLICT,
    }
}

fn reject(err: BoardError) -> ApiError {
    let code = err.error_code();
    warn!(code, error = %err, "board request rejected");
    ApiError { status: board_error_to_status(&err), code, message: err.to_string() }
}

/// `GET /api/board`: snapshot plus any pending events.
pub async fn get_board(State(state): State<AppState>) -> Json<BoardResponse> {
    let mut session = state.session.lock().await;
    respond(&mut session)
}

/// `POST /api/board/refresh`: re-read shared state; reconnects when degraded.
pub async fn refresh(State(state): State<AppState>) -> BoardResult {
    let mut session = state.session.lock().await;
    session.refresh().await.map_err(reject)?;
    Ok(respond(&mut session))
}

/// `POST /api/leader/:user_id`: claim leadership.
pub async fn claim_leader(State(state): State<AppState>, Path(raw): Path<i64>) -> BoardResult {
    let user = user_id(raw)?;
    let mut session = state.session.lock().await;
    session.claim_leader(user).await.map_err(reject)?;
    Ok(respond(&mut session))
}

/// `POST /api/editor/:user_id`: toggle edit focus.
pub async fn toggle_editor(State(state): State<AppState>, Path(raw): Path<i64>) -> BoardResult {
    let user = user_id(raw)?;
    let mut session = state.session.lock().await;
    session.toggle_editor_focus(user).await.map_err(reject)?;
    Ok(respond(&mut session))
}

/// `POST /api/editor/resume`: refocus the last editor.
pub async fn resume_editing(State(state): State<AppState>) -> BoardResult {
    let mut session = state.session.lock().await;
    session.resume_editing().await.map_err(reject)?;
    Ok(respond(&mut session))
}

/// `POST /api/panes/:user_id/scroll`: vertical scroll from one pane.
pub async fn scroll_pane(
    State(state): State<AppState>,
    Path(raw): Path<i64>,
    Json(body): Json<OffsetBody>,
) -> BoardResult {
    let user = user_id(raw)?;
    let mut session = state.session.lock().await;
    session.scroll_vertical(user, body.offset).map_err(reject)?;
    Ok(respond(&mut session))
}

/// `POST /api/panes/:user_id/more`: pane scrolled to its end.
pub async fn load_more(State(state): State<AppState>, Path(raw): Path<i64>) -> BoardResult {
    let user = user_id(raw)?;
    let mut session = state.session.lock().await;
    session.load_next_chunk(user).await.map_err(reject)?;
    Ok(respond(&mut session))
}

/// `PUT /api/scroll/horizontal`: move the user-selector strip.
pub async fn scroll_horizontal(State(state): State<AppState>, Json(body): Json<OffsetBody>) -> BoardResult {
    let mut session = state.session.lock().await;
    session.scroll_horizontal(body.offset).await.map_err(reject)?;
    Ok(respond(&mut session))
}

/// `PUT /api/window`: maximize or restore.
pub async fn set_window(State(state): State<AppState>, Json(body): Json<WindowBody>) -> BoardResult {
    let mut session = state.session.lock().await;
    session.set_maximized(body.maximized).await.map_err(reject)?;
    Ok(respond(&mut session))
}

/// `POST /api/window/resize`: viewport changed size.
pub async fn resize(State(state): State<AppState>) -> BoardResult {
    let mut session = state.session.lock().await;
    session.resize().await.map_err(reject)?;
    Ok(respond(&mut session))
}
