use std::fmt;

use crate::{
    paths::AUTH_PREFIX,
    policy::AccessPolicy,
    roles::{DASHBOARD_SUFFIX, Role},
};

/// Where requests without a token are sent when they hit a protected path.
pub const LOGIN_PATH: &str = "/auth/login";

/// Credential
///
/// The (token, role) pair attached to a request. Either half may be missing
/// independently; every combination maps to a decision. The token is opaque: it is
/// never validated here, only checked for presence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub token: Option<String>,
    pub role: Option<Role>,
}

impl Credential {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(token: Option<&str>, role: Option<&str>) -> Self {
        Self {
            token: token.map(str::to_string),
            role: role.map(Role::new),
        }
    }

    /// A token counts as present only if it is non-empty.
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }

    pub fn role_str(&self) -> Option<&str> {
        self.role.as_ref().map(Role::as_str)
    }
}

/// AuthorizationDecision
///
/// Produced fresh for every request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    Allow,
    RedirectTo(String),
}

impl AuthorizationDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::RedirectTo(target) => Some(target),
        }
    }
}

impl fmt::Display for AuthorizationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("allow"),
            Self::RedirectTo(target) => write!(f, "redirect to {target}"),
        }
    }
}

/// decide
///
/// The edge decision table. Authentication (token present) and authorization (path
/// under the role's base path) are two independent gates, evaluated in order:
///
/// 1. no token, public path: allow
/// 2. no token, protected path: redirect to the login page
/// 3. token, public path: redirect to the role's dashboard
/// 4. token, protected path: allow only under the role's base path, otherwise
///    redirect to the role's dashboard
///
/// A role that does not resolve uses `/auth` as its base path. A redirect whose target
/// is the requested path itself is turned into `Allow`, which keeps that fallback from
/// bouncing a request onto itself.
pub fn decide(policy: &AccessPolicy, path: &str, credential: &Credential) -> AuthorizationDecision {
    match evaluate(policy, path, credential) {
        AuthorizationDecision::RedirectTo(target) if target == path => AuthorizationDecision::Allow,
        decision => decision,
    }
}

fn evaluate(policy: &AccessPolicy, path: &str, credential: &Credential) -> AuthorizationDecision {
    let is_public = policy.public.is_public(path);

    if !credential.has_token() {
        return if is_public {
            AuthorizationDecision::Allow
        } else {
            AuthorizationDecision::RedirectTo(LOGIN_PATH.to_string())
        };
    }

    let base = credential
        .role_str()
        .and_then(|role| policy.roles.resolve_base_path(role));

    match base {
        Some(base) if !is_public && path.starts_with(base) => AuthorizationDecision::Allow,
        Some(base) => AuthorizationDecision::RedirectTo(format!("{base}{DASHBOARD_SUFFIX}")),
        None => AuthorizationDecision::RedirectTo(format!("{AUTH_PREFIX}{DASHBOARD_SUFFIX}")),
    }
}
