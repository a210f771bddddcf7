use crate::{
    AppState,
    access::{PageId, Role},
    auth::{SessionContext, issue_session_token},
    error::ApiError,
    models::{LoginFailureKind, LoginRequest, RenderedView, RolePages, SessionOpened, View},
    navigation::Action,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// Runs one render cycle for the resumed session. The session stays locked until
/// the cycle has rendered, so cycles on one session never interleave.
async fn run_cycle(state: &AppState, ctx: SessionContext, action: Action) -> RenderedView {
    let mut session = ctx.session.lock().await;
    state.navigator.cycle(&mut session, action).await
}

// --- Handlers ---

/// open_session
///
/// [Public Route] Opens a fresh, logged-out session and returns its bearer token
/// together with the login view.
#[utoipa::path(
    post,
    path = "/sessions",
    responses((status = 200, description = "Session opened", body = SessionOpened))
)]
pub async fn open_session(State(state): State<AppState>) -> Result<Json<SessionOpened>, ApiError> {
    let (id, session) = state.sessions.open().await;
    let token = issue_session_token(id, &state.config)?;
    let view = state.navigator.render(&session).await;
    Ok(Json(SessionOpened { token, view }))
}

/// get_view
///
/// [Session Route] Render cycle without a user action (initial load / refresh).
#[utoipa::path(
    get,
    path = "/view",
    responses(
        (status = 200, description = "Current view", body = RenderedView),
        (status = 401, description = "No live session")
    )
)]
pub async fn get_view(ctx: SessionContext, State(state): State<AppState>) -> Json<RenderedView> {
    Json(run_cycle(&state, ctx, Action::Show).await)
}

/// login
///
/// [Session Route] Submits credentials. A failed login still answers with the
/// login view, carrying the failure kind; the status tells credential failures
/// (401) from role resolution failures (403).
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = RenderedView),
        (status = 401, description = "Invalid credentials", body = RenderedView),
        (status = 403, description = "Role could not be resolved", body = RenderedView)
    )
)]
pub async fn login(
    ctx: SessionContext,
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> (StatusCode, Json<RenderedView>) {
    let action = Action::SubmitCredentials {
        principal: payload.email,
        secret: payload.password,
    };
    let rendered = run_cycle(&state, ctx, action).await;

    let status = match &rendered.view {
        View::Login { error: Some(failure) } => match failure.kind {
            LoginFailureKind::RoleResolution => StatusCode::FORBIDDEN,
            LoginFailureKind::MissingFields | LoginFailureKind::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
        },
        _ => StatusCode::OK,
    };
    (status, Json(rendered))
}

/// navigate
///
/// [Session Route] Selects a page. The selection is always recorded for a
/// logged-in session; the returned view says whether it may be shown.
#[utoipa::path(
    post,
    path = "/navigate/{page_id}",
    params(("page_id" = String, Path, description = "Page ID")),
    responses(
        (status = 200, description = "View after navigation", body = RenderedView),
        (status = 401, description = "No live session")
    )
)]
pub async fn navigate(
    ctx: SessionContext,
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Json<RenderedView> {
    Json(run_cycle(&state, ctx, Action::Navigate(PageId::from(page_id))).await)
}

/// logout
///
/// [Session Route] Resets the session to its initial, logged-out state.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 200, description = "Logged out", body = RenderedView))
)]
pub async fn logout(ctx: SessionContext, State(state): State<AppState>) -> Json<RenderedView> {
    Json(run_cycle(&state, ctx, Action::Logout).await)
}

/// get_role_pages
///
/// [Public Route] Declared pages of a role, in declared order. Unknown roles
/// answer with an empty list.
#[utoipa::path(
    get,
    path = "/roles/{role}/pages",
    params(("role" = String, Path, description = "Role identifier")),
    responses((status = 200, description = "Declared pages", body = RolePages))
)]
pub async fn get_role_pages(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Json<RolePages> {
    let role = Role::new(role);
    let pages = state.navigator.filter().table().lookup(&role).to_vec();
    Json(RolePages { role, pages })
}
