use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use tracing::Span;

use crate::domain::models::identity::{Identity, Role};

/// Identity asserted by the gateway. Keycloak authenticates upstream and the
/// gateway forwards the verified subject and role; this service performs no
/// authentication of its own.
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts.headers.get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(StatusCode::UNAUTHORIZED)?
            .to_string();

        let role = match parts.headers.get("x-user-role").and_then(|v| v.to_str().ok()) {
            Some("admin") => Role::Admin,
            Some("tenant") => Role::Tenant,
            _ => return Err(StatusCode::UNAUTHORIZED),
        };

        Span::current().record("user_id", user_id.as_str());

        Ok(AuthUser(Identity { user_id, role }))
    }
}

/// AuthUser narrowed to the admin role.
pub struct AdminUser(pub Identity);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            return Err(StatusCode::FORBIDDEN);
        }
        Ok(AdminUser(identity))
    }
}
