use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::{access::Role, error::IdentityError, repository::RoleResolver};

/// CredentialValidator
///
/// External check of a principal/secret pair. `Ok(())` means the credentials are
/// valid; the error says whether the service said no or could not answer.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, principal: &str, secret: &str) -> Result<(), IdentityError>;
}

/// SupabaseErrorBody
///
/// The fields Supabase Auth may use for a human-readable rejection reason.
#[derive(Deserialize, Default)]
struct SupabaseErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

/// SupabaseCredentialValidator
///
/// Validates credentials with Supabase Auth's password grant. The issued access
/// token is discarded: this service keeps its own session tokens.
#[derive(Clone)]
pub struct SupabaseCredentialValidator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseCredentialValidator {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl CredentialValidator for SupabaseCredentialValidator {
    async fn validate(&self, principal: &str, secret: &str) -> Result<(), IdentityError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);

        let response = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": principal, "password": secret }))
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::UNAUTHORIZED {
            let body = response.json::<SupabaseErrorBody>().await.unwrap_or_default();
            let message = body
                .error_description
                .or(body.msg)
                .or(body.message)
                .unwrap_or_else(|| "invalid e-mail or password".to_string());
            return Err(IdentityError::Rejected(message));
        }

        Err(IdentityError::Unavailable(format!("auth service answered {}", status)))
    }
}

/// MockIdentityProvider
///
/// In-memory user store implementing both collaborator contracts. Used by the
/// test suites to drive every login outcome without a network.
#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    users: HashMap<String, (String, Option<Role>)>,
    /// When true, every call fails as if the backing service were down.
    pub should_fail: bool,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Adds a user. `role: None` models a valid account without a profile.
    pub fn with_user(mut self, email: &str, password: &str, role: Option<&str>) -> Self {
        self.users.insert(
            email.to_string(),
            (password.to_string(), role.map(Role::from)),
        );
        self
    }
}

#[async_trait]
impl CredentialValidator for MockIdentityProvider {
    async fn validate(&self, principal: &str, secret: &str) -> Result<(), IdentityError> {
        if self.should_fail {
            return Err(IdentityError::Unavailable("mock identity failure".to_string()));
        }
        match self.users.get(principal) {
            Some((password, _)) if password == secret => Ok(()),
            _ => Err(IdentityError::Rejected("invalid e-mail or password".to_string())),
        }
    }
}

#[async_trait]
impl RoleResolver for MockIdentityProvider {
    async fn resolve_role(&self, principal: &str) -> Result<Option<Role>, IdentityError> {
        if self.should_fail {
            return Err(IdentityError::Unavailable("mock identity failure".to_string()));
        }
        Ok(self.users.get(principal).and_then(|(_, role)| role.clone()))
    }
}
