use std::sync::Arc;
use thiserror::Error;

use crate::{
    paths::PublicRoutes,
    roles::{Role, RoleRouteTable},
};

/// Construction errors for the access policy. Only reachable when a custom table or
/// public set is built; the standard policy is always valid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("role '{0}' is mapped more than once")]
    DuplicateRole(Role),

    #[error("base path '{base}' for role '{role}' must start with '/'")]
    RelativeBasePath { role: Role, base: String },

    #[error("public prefix '{0}' must start with '/'")]
    RelativePublicPrefix(String),
}

/// AccessPolicy
///
/// The only configuration the decision engines consume: which role owns which base
/// path, and which prefixes are public. It is built once at startup and handed to both
/// the edge router and the client bootstrap, so the two surfaces stay consistent
/// without sharing any mutable state.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    pub roles: RoleRouteTable,
    pub public: PublicRoutes,
}

impl AccessPolicy {
    pub fn new(roles: RoleRouteTable, public: PublicRoutes) -> Self {
        Self { roles, public }
    }

    pub fn standard() -> Self {
        Self::new(RoleRouteTable::standard(), PublicRoutes::standard())
    }
}

/// PolicyState
///
/// Shared, read-only handle to the policy. Cloning is a reference-count bump.
pub type PolicyState = Arc<AccessPolicy>;
