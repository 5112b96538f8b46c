use crate::policy::PolicyError;

/// Prefix of the authentication area (login page, generic auth landing page).
pub const AUTH_PREFIX: &str = "/auth";

/// PublicRoutes
///
/// The ordered list of path prefixes reachable without a credential.
/// Matching is a case-sensitive `starts_with`; the order only affects how soon a
/// match is found, never the result.
#[derive(Debug, Clone)]
pub struct PublicRoutes {
    prefixes: Vec<String>,
}

impl PublicRoutes {
    pub fn new<I, P>(prefixes: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(Into::into)
            .map(|prefix: String| {
                if prefix.starts_with('/') {
                    Ok(prefix)
                } else {
                    Err(PolicyError::RelativePublicPrefix(prefix))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { prefixes })
    }

    pub fn standard() -> Self {
        Self {
            prefixes: vec![AUTH_PREFIX.to_string()],
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}
