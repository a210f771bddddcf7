use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    access::{PageId, Role},
    error::{LoginError, RoleResolutionError},
    registry::PageContent,
};

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Credential submission for the current session (POST /login).
/// The password is forwarded to the credential validator and never stored or logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "vendedor@example.com")]
    pub email: String,
    pub password: String,
}

// --- Render Output ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum LoginFailureKind {
    MissingFields,
    InvalidCredentials,
    RoleResolution,
}

/// LoginFailure
///
/// Why the last credential submission did not log the session in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginFailure {
    pub kind: LoginFailureKind,
    pub message: String,
}

impl From<&LoginError> for LoginFailure {
    fn from(error: &LoginError) -> Self {
        let kind = match error {
            LoginError::MissingFields => LoginFailureKind::MissingFields,
            LoginError::InvalidCredentials(_) => LoginFailureKind::InvalidCredentials,
            LoginError::RoleResolution(_) => LoginFailureKind::RoleResolution,
        };
        let message = match error {
            // Lookup details stay in the logs.
            LoginError::RoleResolution(RoleResolutionError::Lookup(_)) => {
                "could not load user profile".to_string()
            }
            other => other.to_string(),
        };
        Self { kind, message }
    }
}

/// View
///
/// The one thing a render cycle decided to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum View {
    /// Not logged in. Carries the last login failure, if any.
    Login { error: Option<LoginFailure> },
    /// Logged in, but the selected page is not a registered page.
    Welcome,
    /// A permitted page, rendered.
    Page {
        page: PageId,
        label: String,
        content: PageContent,
    },
    /// A registered page the role may not open.
    AccessDenied { page: PageId },
    /// The page's handler failed. Scoped to this page and this cycle.
    PageError { page: PageId, message: String },
    /// The page registry could not be loaded at startup.
    Unavailable { message: String },
}

/// NavItem
///
/// One entry of the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavItem {
    pub id: PageId,
    pub label: String,
    /// True for the session's selected page.
    pub active: bool,
}

/// RenderedView
///
/// Full output of one render cycle: who is logged in, the menu they may use and
/// the view itself. Returned by every session route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RenderedView {
    pub principal: Option<String>,
    pub role: Option<Role>,
    pub selected_page: PageId,
    pub menu: Vec<NavItem>,
    pub view: View,
}

/// SessionOpened
///
/// Response of POST /sessions: the bearer token for later requests and the
/// initial (login) view.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionOpened {
    pub token: String,
    pub view: RenderedView,
}

/// RolePages
///
/// Declared pages of one role, in declared order (GET /roles/{role}/pages).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RolePages {
    pub role: Role,
    pub pages: Vec<PageId>,
}
