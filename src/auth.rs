use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;

use crate::{
    decision::{AuthorizationDecision, Credential, decide},
    policy::PolicyState,
};

/// Cookie carrying the opaque session token, set by the login backend.
pub const TOKEN_COOKIE: &str = "token";
/// Cookie carrying the role claim, set by the login backend alongside the token.
pub const ROLE_COOKIE: &str = "role";

/// Credential Extractor Implementation
///
/// Reads the `token` and `role` cookies off the request. Extraction never fails:
/// a missing cookie, an empty value or an unreadable `Cookie` header all simply
/// leave the corresponding half of the credential absent, and the decision table
/// takes it from there.
impl<S> FromRequestParts<S> for Credential
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(credential_from_headers(&parts.headers))
    }
}

/// credential_from_headers
///
/// Collects the credential from every `Cookie` header present. When a cookie name
/// repeats, the first occurrence wins.
pub fn credential_from_headers(headers: &HeaderMap) -> Credential {
    let mut token = None;
    let mut role = None;

    let pairs = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='));

    for (name, value) in pairs {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match name.trim() {
            TOKEN_COOKIE if token.is_none() => token = Some(value),
            ROLE_COOKIE if role.is_none() => role = Some(value),
            _ => {}
        }
    }

    Credential::new(token, role)
}

/// edge_router
///
/// The per-request gate. Runs before any dashboard handler, computes the decision from
/// the path and cookies, and either forwards the request untouched or answers with a
/// `307 Temporary Redirect`. Nothing is rendered and the credential is never modified.
pub async fn edge_router(
    State(policy): State<PolicyState>,
    credential: Credential,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let decision = decide(&policy, &path, &credential);

    match decision {
        AuthorizationDecision::Allow => {
            tracing::debug!(
                path = %path,
                has_token = credential.has_token(),
                role = credential.role_str().unwrap_or("-"),
                "edge: allow"
            );
            next.run(request).await
        }
        AuthorizationDecision::RedirectTo(target) => {
            tracing::info!(
                path = %path,
                has_token = credential.has_token(),
                role = credential.role_str().unwrap_or("-"),
                location = %target,
                "edge: redirect"
            );
            Redirect::temporary(&target).into_response()
        }
    }
}
