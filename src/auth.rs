use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    store::{SessionStoreState, SharedSession},
};

/// Claims
///
/// Payload of the session token handed out by POST /sessions.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the id of the server-side session this token resumes.
    pub sub: Uuid,
    /// Expiration Time (exp).
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// Signs a token resuming session `session_id`, valid for `session_ttl_secs`.
pub fn issue_session_token(
    session_id: Uuid,
    config: &AppConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: session_id,
        iat: now as usize,
        exp: (now + config.session_ttl_secs) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// SessionContext
///
/// The session resumed for the current request: its id and the stored session
/// itself. Lock `session` for the length of a render cycle.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: Uuid,
    pub session: SharedSession,
}

/// SessionContext Extractor Implementation
///
/// 0. A context already resolved by the session layer is reused as-is.
/// 1. Local bypass: in `Env::Local`, an `x-session-id` header naming a live
///    session is accepted as-is.
/// 2. Otherwise a `Bearer` session token is required and must verify and be
///    unexpired.
/// 3. The session it names must still be in the store.
///
/// Rejection: `StatusCode::UNAUTHORIZED` on any failure.
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
    SessionStoreState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<SessionContext>() {
            return Ok(ctx.clone());
        }

        let store = SessionStoreState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-session-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| Uuid::parse_str(raw).ok());
            if let Some(id) = bypass_id {
                if let Some(session) = store.load(id).await {
                    return Ok(SessionContext { id, session });
                }
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                _ => tracing::warn!("session token rejected: {:?}", e.kind()),
            }
            StatusCode::UNAUTHORIZED
        })?;

        let id = token_data.claims.sub;
        let session = store.load(id).await.ok_or_else(|| {
            tracing::debug!(session_id = %id, "token names an unknown session");
            StatusCode::UNAUTHORIZED
        })?;

        Ok(SessionContext { id, session })
    }
}
