use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Session Router Module
///
/// Every route here resumes the caller's session, applies one user action and
/// answers with the resulting `RenderedView`. Logged-out sessions are valid here:
/// they simply render the login view.
pub fn session_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /view
        // Render cycle without an action (first load, refresh).
        .route("/view", get(handlers::get_view))
        // POST /login
        // Credential submission; LoggedOut -> LoggedIn on success.
        .route("/login", post(handlers::login))
        // POST /navigate/{page_id}
        // Records the selected page; access is decided while rendering.
        .route("/navigate/{page_id}", post(handlers::navigate))
        // POST /logout
        // Back to the initial state.
        .route("/logout", post(handlers::logout))
}
