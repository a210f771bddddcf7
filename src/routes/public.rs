use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that need no session token: liveness, opening a session and
/// reading the declared role table.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /sessions
        // Opens a logged-out session and returns its bearer token.
        .route("/sessions", post(handlers::open_session))
        // GET /roles/{role}/pages
        // Pages a role declares, in declared order.
        .route("/roles/{role}/pages", get(handlers::get_role_pages))
}
