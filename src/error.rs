use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::access::{PageId, Role};

/// LoginError
///
/// Every way a credential submission can leave the session in `LoggedOut`.
/// `MissingFields` and `InvalidCredentials` together form the credential failure
/// kind; `RoleResolution` is kept apart so the login view can say which one happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("please fill in both e-mail and password")]
    MissingFields,
    #[error("{0}")]
    InvalidCredentials(String),
    #[error(transparent)]
    RoleResolution(#[from] RoleResolutionError),
}

impl LoginError {
    /// True for the credential failure kind (as opposed to role resolution).
    pub fn is_credential_error(&self) -> bool {
        matches!(self, Self::MissingFields | Self::InvalidCredentials(_))
    }
}

/// RoleResolutionError
///
/// The principal passed credential validation but no usable role came back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleResolutionError {
    /// The identity store has no role for this principal.
    #[error("no profile is assigned to this user")]
    NotFound,
    /// A role came back but the access table does not declare it.
    #[error("profile '{0}' is not recognized")]
    Unrecognized(Role),
    /// The lookup itself failed.
    #[error("could not load user profile: {0}")]
    Lookup(String),
}

/// IdentityError
///
/// Returned by the external credential validator and role resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The collaborator answered and said no.
    #[error("{0}")]
    Rejected(String),
    /// The collaborator could not be reached or answered with garbage.
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// PageRenderError
///
/// A render handler failed. Scoped to the page; never touches the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRenderError {
    #[error("{0}")]
    Failed(String),
    /// The handler panicked or its task was cancelled.
    #[error("page handler aborted")]
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("page id must not be empty")]
    EmptyId,
    #[error("page '{0}' is registered twice")]
    DuplicatePage(PageId),
}

/// LoadError
///
/// The page loader could not produce a registry at all.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read page catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid page catalog {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Error)]
pub enum AccessTableError {
    #[error("cannot read role access table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid role access table {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// ApiError
///
/// Failures at the HTTP boundary that never reach the navigator.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session could not be resumed")]
    Unauthorized,
    #[error("failed to issue session token")]
    TokenIssue(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::TokenIssue(ref e) => {
                tracing::error!("session token issue failed: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
