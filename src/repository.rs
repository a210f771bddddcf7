use async_trait::async_trait;
use sqlx::PgPool;

use crate::{access::Role, error::IdentityError};

/// RoleResolver
///
/// Looks up the role of an already-validated principal. `Ok(None)` means the
/// principal has no role; `Err` means the lookup itself broke.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn resolve_role(&self, principal: &str) -> Result<Option<Role>, IdentityError>;
}

/// PostgresRoleResolver
///
/// Resolves roles from the `usuarios` / `user_roles` tables.
pub struct PostgresRoleResolver {
    pool: PgPool,
}

impl PostgresRoleResolver {
    /// Creates a new resolver using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleResolver for PostgresRoleResolver {
    async fn resolve_role(&self, principal: &str) -> Result<Option<Role>, IdentityError> {
        let row: Option<String> = sqlx::query_scalar(
            r#"
            SELECT r.role_name
            FROM usuarios u
            JOIN user_roles r ON u.role_id = r.id
            WHERE u.email = $1
            "#,
        )
        .bind(principal)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("resolve_role error: {:?}", e);
            IdentityError::Unavailable(e.to_string())
        })?;

        Ok(row.map(Role::new))
    }
}
