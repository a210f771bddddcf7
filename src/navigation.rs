use std::fmt;
use std::sync::Arc;

use crate::{
    access::{PageId, RoleAccessTable},
    error::{LoadError, LoginError, PageRenderError},
    filter::{AccessFilter, Target},
    identity::CredentialValidator,
    models::{LoginFailure, NavItem, RenderedView, View},
    registry::{PageContent, PageEntry, PageRegistry},
    repository::RoleResolver,
    session::{Session, SessionState},
};

/// Action
///
/// The user event that triggered a render cycle.
pub enum Action {
    /// Initial load or refresh: no transition.
    Show,
    SubmitCredentials { principal: String, secret: String },
    Navigate(PageId),
    Logout,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show => f.write_str("Show"),
            Self::SubmitCredentials { principal, .. } => f
                .debug_struct("SubmitCredentials")
                .field("principal", principal)
                .finish_non_exhaustive(),
            Self::Navigate(page) => f.debug_tuple("Navigate").field(page).finish(),
            Self::Logout => f.write_str("Logout"),
        }
    }
}

/// Navigator
///
/// Drives one render cycle: applies the user's action to the session, then
/// decides between the login view, the welcome view, a permitted page, a denial
/// or a page-scoped error. Shared read-only state only; the session is passed in.
pub struct Navigator {
    filter: AccessFilter,
    // Err carries the loader failure shown to logged-in users.
    pages: Result<PageRegistry, String>,
    validator: Arc<dyn CredentialValidator>,
    resolver: Arc<dyn RoleResolver>,
}

impl Navigator {
    pub fn new(
        table: Arc<RoleAccessTable>,
        pages: Result<PageRegistry, LoadError>,
        validator: Arc<dyn CredentialValidator>,
        resolver: Arc<dyn RoleResolver>,
    ) -> Self {
        let pages = pages.map_err(|e| {
            tracing::error!("page registry unavailable: {}", e);
            "dashboards are unavailable right now, try again later".to_string()
        });
        Self {
            filter: AccessFilter::new(table),
            pages,
            validator,
            resolver,
        }
    }

    pub fn filter(&self) -> &AccessFilter {
        &self.filter
    }

    pub fn registry(&self) -> Option<&PageRegistry> {
        self.pages.as_ref().ok()
    }

    /// Applies `action` to `session` and renders the result.
    pub async fn cycle(&self, session: &mut Session, action: Action) -> RenderedView {
        tracing::debug!(?action, "render cycle");
        match action {
            Action::Show => {}
            Action::SubmitCredentials { principal, secret } => {
                // Already logged in: the form is not on screen, nothing to submit.
                if !session.is_authenticated() {
                    if let Err(e) = session
                        .submit_credentials(
                            &principal,
                            &secret,
                            self.validator.as_ref(),
                            self.resolver.as_ref(),
                            self.filter.table(),
                        )
                        .await
                    {
                        return Self::login_view(session, Some(&e));
                    }
                }
            }
            Action::Navigate(page) => {
                session.navigate(page);
            }
            Action::Logout => session.logout(),
        }
        self.render(session).await
    }

    /// Renders the session as it stands, without any transition.
    pub async fn render(&self, session: &Session) -> RenderedView {
        let SessionState::LoggedIn { principal, role } = session.state() else {
            return Self::login_view(session, None);
        };
        let selected = session.selected_page();

        let registry = match &self.pages {
            Ok(registry) => registry,
            Err(message) => {
                return RenderedView {
                    principal: Some(principal.clone()),
                    role: Some(role.clone()),
                    selected_page: selected.clone(),
                    menu: Vec::new(),
                    view: View::Unavailable {
                        message: message.clone(),
                    },
                };
            }
        };

        let menu = self
            .filter
            .filter_accessible(registry, role)
            .iter()
            .map(|entry| NavItem {
                id: entry.id.clone(),
                label: entry.label.clone(),
                active: &entry.id == selected,
            })
            .collect();

        let view = match self.filter.resolve_target(registry, role, selected) {
            Target::Permitted(entry) => match invoke(entry).await {
                Ok(content) => View::Page {
                    page: entry.id.clone(),
                    label: entry.label.clone(),
                    content,
                },
                Err(e) => {
                    tracing::error!(page = %entry.id, "page render failed: {}", e);
                    View::PageError {
                        page: entry.id.clone(),
                        message: format!("could not load page {}", entry.label),
                    }
                }
            },
            Target::Denied(entry) => {
                tracing::warn!(principal = %principal, %role, page = %entry.id, "access denied");
                View::AccessDenied {
                    page: entry.id.clone(),
                }
            }
            Target::Unknown => View::Welcome,
        };

        RenderedView {
            principal: Some(principal.clone()),
            role: Some(role.clone()),
            selected_page: selected.clone(),
            menu,
            view,
        }
    }

    fn login_view(session: &Session, error: Option<&LoginError>) -> RenderedView {
        RenderedView {
            principal: None,
            role: None,
            selected_page: session.selected_page().clone(),
            menu: Vec::new(),
            view: View::Login {
                error: error.map(LoginFailure::from),
            },
        }
    }
}

/// Runs the handler on its own task so a panic stays inside this page.
async fn invoke(entry: &PageEntry) -> Result<PageContent, PageRenderError> {
    let handler = Arc::clone(&entry.handler);
    match tokio::spawn(async move { handler.render().await }).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(page = %entry.id, "page handler aborted: {}", e);
            Err(PageRenderError::Aborted)
        }
    }
}
