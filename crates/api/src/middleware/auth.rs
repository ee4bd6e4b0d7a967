//! Authentication middleware for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde_json::json;
use tracing::debug;

use crate::AppState;
use microloan_core::auth::{Actor, Role};
use microloan_shared::JwtError;
use microloan_shared::types::UserId;

/// Name of the cookie that may carry the access token.
pub const TOKEN_COOKIE: &str = "token";

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

fn unauthorized(error: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// Authentication middleware that validates JWT tokens.
///
/// The token comes from the `Authorization: Bearer` header, falling back to
/// the `token` cookie. Valid claims with a known role are stored in the
/// request extensions as an [`Actor`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let header_token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::to_owned);

    let Some(token) = header_token.or_else(|| jar.get(TOKEN_COOKIE).map(|c| c.value().to_owned()))
    else {
        return unauthorized(
            "UNAUTHORIZED",
            "A bearer token or token cookie is required",
        );
    };

    let claims = match state.jwt_service.validate_token(&token) {
        Ok(claims) => claims,
        Err(JwtError::Expired) => return unauthorized("UNAUTHORIZED", "Token has expired"),
        Err(e) => {
            debug!(error = %e, "token rejected");
            return unauthorized("UNAUTHORIZED", "Invalid or malformed token");
        }
    };

    let Some(role) = Role::parse(&claims.role) else {
        debug!(role = %claims.role, "token carries an unknown role");
        return unauthorized("UNAUTHORIZED", "Invalid or malformed token");
    };

    request
        .extensions_mut()
        .insert(Actor::new(UserId::from_uuid(claims.user_id()), role));
    next.run(request).await
}

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(AuthUser(actor): AuthUser) -> impl IntoResponse {
///     let user_id = actor.user_id;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Actor);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .copied()
            .map(AuthUser)
            .ok_or_else(|| unauthorized("UNAUTHORIZED", "Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }
}
