use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use crate::policy::PolicyError;

/// Role
///
/// The opaque role claim carried by a credential (e.g. `super_admin`, `admin`, `operator`).
/// No enumeration is enforced here: a role that is missing from the table is a valid
/// state, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Lets the table be queried with a borrowed `&str` claim.
impl Borrow<str> for Role {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// DashboardRole
///
/// The finite set of roles the client bootstrap knows how to land on a dashboard.
/// Matching is exact: `Admin`, `admin ` or `ADMIN` are not recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardRole {
    SuperAdmin,
    Admin,
    Operator,
}

impl DashboardRole {
    pub const ALL: [DashboardRole; 3] = [
        DashboardRole::SuperAdmin,
        DashboardRole::Admin,
        DashboardRole::Operator,
    ];

    pub fn from_claim(claim: &str) -> Option<Self> {
        match claim {
            "super_admin" => Some(Self::SuperAdmin),
            "admin" => Some(Self::Admin),
            "operator" => Some(Self::Operator),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Operator => "operator",
        }
    }
}

/// Suffix appended to a role's base path to form its dashboard landing page.
pub const DASHBOARD_SUFFIX: &str = "/dashboard";

/// RoleRouteTable
///
/// Maps each known role to the base path prefix of its protected area. Built once at
/// startup and never mutated; lookups are plain reads and need no synchronisation.
#[derive(Debug, Clone)]
pub struct RoleRouteTable {
    entries: HashMap<Role, String>,
}

impl RoleRouteTable {
    /// Builds a table, rejecting duplicate roles and base paths that are not absolute.
    pub fn new<I, R, P>(entries: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = (R, P)>,
        R: Into<String>,
        P: Into<String>,
    {
        let mut table = HashMap::new();
        for (role, base) in entries {
            let role = Role::new(role);
            let base = base.into();
            if !base.starts_with('/') {
                return Err(PolicyError::RelativeBasePath { role, base });
            }
            if table.contains_key(&role) {
                return Err(PolicyError::DuplicateRole(role));
            }
            table.insert(role, base);
        }
        Ok(Self { entries: table })
    }

    /// The built-in table of the fleet dashboard.
    pub fn standard() -> Self {
        let entries = DashboardRole::ALL
            .into_iter()
            .map(|role| (Role::new(role.as_str()), format!("/client/{}", role.as_str())))
            .collect();
        Self { entries }
    }

    /// Looks up the base path for a role. Unknown roles resolve to `None`; callers
    /// decide what the fallback is.
    pub fn resolve_base_path(&self, role: &str) -> Option<&str> {
        self.entries.get(role).map(String::as_str)
    }

    /// `base + "/dashboard"` for a resolvable role.
    pub fn dashboard_path(&self, role: &str) -> Option<String> {
        self.resolve_base_path(role)
            .map(|base| format!("{base}{DASHBOARD_SUFFIX}"))
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
