use axum::{
    extract::{FromRef, Request},
    http::HeaderName,
    Router,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access-control core.
pub mod access;
pub mod filter;
pub mod navigation;
pub mod registry;
pub mod session;

// Collaborators, session store and the HTTP surface.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod repository;
pub mod store;

pub mod routes;
use auth::SessionContext;
use routes::{public, session as session_routes};

// --- Public Re-exports ---

pub use access::{PageId, Role, RoleAccessTable};
pub use config::AppConfig;
pub use navigation::{Action, Navigator};
pub use registry::{CatalogPageLoader, PageLoader, PageRegistry};
pub use store::{InMemorySessionStore, SessionStore, SessionStoreState, SharedSession};

/// ApiDoc
///
/// OpenAPI description of every route, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::open_session, handlers::get_view, handlers::login,
        handlers::navigate, handlers::logout, handlers::get_role_pages
    ),
    components(
        schemas(
            models::LoginRequest, models::LoginFailure, models::LoginFailureKind,
            models::View, models::NavItem, models::RenderedView, models::SessionOpened,
            models::RolePages, registry::PageContent, access::PageId, access::Role,
        )
    ),
    tags(
        (name = "dashboard-portal", description = "Role-gated dashboard navigation API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything shared across requests. The navigator and its tables are read-only;
/// per-user state lives only in the session store.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStoreState,
    pub navigator: Arc<Navigator>,
    pub config: AppConfig,
}

impl FromRef<AppState> for SessionStoreState {
    fn from_ref(app_state: &AppState) -> SessionStoreState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// session_middleware
///
/// Rejects session routes with 401 before the handler runs when the request does
/// not resume a live session. The resolved context is handed on to the handler
/// through the request extensions.
async fn session_middleware(
    session: SessionContext,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(session);
    next.run(request).await
}

/// create_router
///
/// Assembles the routes, the session layer and the observability stack.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            session_routes::session_routes()
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    session_middleware,
                ))
        )
        .with_state(state);

    base_router
        .layer(
             ServiceBuilder::new()
                 .layer(SetRequestIdLayer::new(
                     x_request_id.clone(),
                     MakeRequestUuid,
                 ))
                 .layer(
                     TraceLayer::new_for_http()
                         .make_span_with(trace_span_logger)
                         .on_response(
                             DefaultOnResponse::new()
                                 .level(Level::INFO)
                                 .latency_unit(tower_http::LatencyUnit::Millis)
                         )
                 )
                 .layer(PropagateRequestIdLayer::new(x_request_id))
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one HTTP request, correlated by its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
