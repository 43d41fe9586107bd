//! Access-control guards.
//!
//! Each guard verifies the bearer token, re-checks the subject against live
//! store state and enforces a role set before the wrapped handler runs.
//! Status mapping: missing/malformed header 400, expired or invalid token
//! 401, disabled account or insufficient role 403.

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use userdir_auth::{AuthService, Role};

use crate::app::errors;
use crate::context::AuthContext;

#[derive(Clone)]
pub struct GuardState {
    pub auth: Arc<AuthService>,
}

/// Base guard: any authenticated, enabled user.
pub async fn require_auth(
    State(state): State<GuardState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    run_guard(state, req, next, None).await
}

/// Privileged guard: role must be super or team.
pub async fn require_privileged(
    State(state): State<GuardState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    run_guard(state, req, next, Some(&[Role::Super, Role::Team])).await
}

/// Super-only guard for user mutations.
pub async fn require_super(
    State(state): State<GuardState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    run_guard(state, req, next, Some(&[Role::Super])).await
}

/// Team guard for the diagnostics endpoint.
pub async fn require_team(
    State(state): State<GuardState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    run_guard(state, req, next, Some(&[Role::Team])).await
}

async fn run_guard(
    state: GuardState,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
    required: Option<&'static [Role]>,
) -> Result<Response, Response> {
    let user = state
        .auth
        .authenticate(extract_bearer(req.headers()))
        .map_err(errors::auth_error_to_response)?;

    if let Some(required) = required {
        state
            .auth
            .authorize(&user, required)
            .map_err(errors::auth_error_to_response)?;
    }

    req.extensions_mut().insert(AuthContext::new(user));
    Ok(next.run(req).await)
}

/// `None` when the header is absent or not a bearer token; the auth core
/// turns that into `TokenError::Missing`.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn bearer_is_extracted() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_or_malformed_header_yields_none() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
        assert_eq!(extract_bearer(&headers_with("Basic abc")), None);
        assert_eq!(extract_bearer(&headers_with("Bearer ")), None);
        assert_eq!(extract_bearer(&headers_with("abc.def.ghi")), None);
    }
}
