use serde::{Deserialize, Serialize};

use crate::{
    access::{PageId, Role, RoleAccessTable},
    error::{IdentityError, LoginError, RoleResolutionError},
    identity::CredentialValidator,
    repository::RoleResolver,
};

/// SessionState
///
/// Authentication half of a session. The principal and role only exist while
/// logged in, so they live inside the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    LoggedOut,
    LoggedIn { principal: String, role: Role },
}

/// Session
///
/// Per-interaction navigation state. Owned by exactly one interaction context
/// (see [`crate::store`]); never shared between principals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    state: SessionState,
    selected_page: PageId,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: SessionState::LoggedOut,
            selected_page: PageId::landing(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn { .. })
    }

    pub fn principal(&self) -> Option<&str> {
        match &self.state {
            SessionState::LoggedIn { principal, .. } => Some(principal),
            SessionState::LoggedOut => None,
        }
    }

    pub fn role(&self) -> Option<&Role> {
        match &self.state {
            SessionState::LoggedIn { role, .. } => Some(role),
            SessionState::LoggedOut => None,
        }
    }

    pub fn selected_page(&self) -> &PageId {
        &self.selected_page
    }

    /// submit_credentials
    ///
    /// `LoggedOut -> LoggedIn` when the validator accepts the credentials and the
    /// resolver returns a role the access table declares. On any failure the
    /// session is left untouched. Collaborator faults never escape: a broken
    /// validator counts as rejected credentials, a broken resolver as a failed
    /// role lookup.
    pub async fn submit_credentials(
        &mut self,
        principal: &str,
        secret: &str,
        validator: &dyn CredentialValidator,
        resolver: &dyn RoleResolver,
        table: &RoleAccessTable,
    ) -> Result<(), LoginError> {
        let principal = principal.trim();
        if principal.is_empty() || secret.is_empty() {
            return Err(LoginError::MissingFields);
        }

        match validator.validate(principal, secret).await {
            Ok(()) => {}
            Err(IdentityError::Rejected(message)) => {
                tracing::warn!(principal, "credentials rejected");
                return Err(LoginError::InvalidCredentials(message));
            }
            Err(e @ IdentityError::Unavailable(_)) => {
                tracing::error!(principal, "credential validation failed: {}", e);
                return Err(LoginError::InvalidCredentials(
                    "could not verify credentials, try again later".to_string(),
                ));
            }
        }

        let role = match resolver.resolve_role(principal).await {
            Ok(Some(role)) if table.contains_role(&role) => role,
            Ok(Some(role)) => {
                tracing::warn!(principal, %role, "role has no access table entry");
                return Err(RoleResolutionError::Unrecognized(role).into());
            }
            Ok(None) => {
                tracing::warn!(principal, "no role assigned");
                return Err(RoleResolutionError::NotFound.into());
            }
            Err(e) => {
                tracing::error!(principal, "role lookup failed: {}", e);
                return Err(RoleResolutionError::Lookup(e.to_string()).into());
            }
        };

        tracing::info!(principal, %role, "login succeeded");
        self.state = SessionState::LoggedIn {
            principal: principal.to_string(),
            role,
        };
        self.selected_page = PageId::landing();
        Ok(())
    }

    /// Records the navigation intent. Permission is not checked here; the render
    /// cycle decides between the page and a denial. Returns `false` (and records
    /// nothing) when logged out.
    pub fn navigate(&mut self, page: PageId) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        self.selected_page = page;
        true
    }

    /// Back to the initial state, whatever the current one is.
    pub fn logout(&mut self) {
        if let Some(principal) = self.principal() {
            tracing::info!(principal, "logged out");
        }
        *self = Self::default();
    }
}
