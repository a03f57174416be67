//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every board operation is a small JSON endpoint over the shared session.
//! Mutating routes answer with the fresh snapshot plus the events the
//! operation produced, so a client can either re-render or apply deltas.

pub mod boards;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/board", get(boards::get_board))
        .route("/api/board/refresh", post(boards::refresh))
        .route("/api/leader/{user_id}", post(boards::claim_leader))
        .route("/api/editor/resume", post(boards::resume_editing))
        .route("/api/editor/{user_id}", post(boards::toggle_editor))
        .route("/api/panes/{user_id}/scroll", post(boards::scroll_pane))
        .route("/api/panes/{user_id}/more", post(boards::load_more))
        .route("/api/scroll/horizontal", put(boards::scroll_horizontal))
        .route("/api/window", put(boards::set_window))
        .route("/api/window/resize", post(boards::resize))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
