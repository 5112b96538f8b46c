//! Client session bootstrap.
//!
//! Runs once per page load (and on logout) in the client context and picks where the
//! user should land using only locally cached identity: no network round-trip, no
//! token validation.
//!
//! This is a UX convenience, not a security control. The cached role is whatever the
//! client stored and can be edited by the user; the edge router, checking the role
//! against the route table on every request, is the actual authorization boundary.

use serde::Deserialize;
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::{
    paths::AUTH_PREFIX,
    policy::PolicyState,
    roles::DashboardRole,
};

/// Local storage key holding the opaque session token.
pub const TOKEN_KEY: &str = "token";
/// Local storage key holding the serialized user (JSON with a `role` field).
pub const USER_KEY: &str = "user";
/// Generic auth landing page; also where unauthenticated loads are sent.
pub const AUTH_LANDING: &str = AUTH_PREFIX;

/// Locally persisted key/value storage (browser local storage or an equivalent).
pub trait IdentityStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn remove(&self, key: &str);
}

/// Client-side navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// MemoryIdentityStore
///
/// In-process `IdentityStore` for hosts without persistent storage, and for tests.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding a token and a serialized user blob, as written by the login flow.
    pub fn with_identity(token: &str, user: &str) -> Self {
        let store = Self::new();
        store.set(TOKEN_KEY, token);
        store.set(USER_KEY, user);
        store
    }

    pub fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

// Only the role matters here; any other fields of the cached user are ignored.
#[derive(Deserialize)]
struct CachedUser {
    role: Option<String>,
}

/// Identity found in local storage. `role` is `None` when the user blob could not be
/// parsed or carries no role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedIdentity {
    pub role: Option<String>,
}

/// Reads the cached identity. Both keys must be present and non-empty; a malformed
/// user blob degrades to an unresolved role rather than an error.
pub fn read_cached_identity(store: &dyn IdentityStore) -> Option<CachedIdentity> {
    store.get(TOKEN_KEY).filter(|token| !token.is_empty())?;
    let user = store.get(USER_KEY).filter(|user| !user.is_empty())?;

    let role = match serde_json::from_str::<CachedUser>(&user) {
        Ok(cached) => cached.role,
        Err(err) => {
            tracing::warn!(error = %err, "bootstrap: cached user is not valid JSON, role unresolved");
            None
        }
    };

    Some(CachedIdentity { role })
}

/// BootstrapPlan
///
/// What the bootstrap intends to do. `Immediate` navigations skip the display delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapPlan {
    Immediate(String),
    Delayed(String),
}

impl BootstrapPlan {
    pub fn target(&self) -> &str {
        match self {
            Self::Immediate(target) | Self::Delayed(target) => target,
        }
    }
}

/// Result of starting a plan.
pub enum BootstrapRun {
    Navigated(String),
    Scheduled(ScheduledRedirect),
}

/// SessionBootstrap
///
/// The load-time decision engine. Holds the shared policy and the display delay used
/// before landing on a dashboard, so the UI can paint feedback first.
#[derive(Clone)]
pub struct SessionBootstrap {
    policy: PolicyState,
    delay: Duration,
}

impl SessionBootstrap {
    pub fn new(policy: PolicyState, delay: Duration) -> Self {
        Self { policy, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Plan for a regular page load.
    pub fn plan(&self, store: &dyn IdentityStore) -> BootstrapPlan {
        match read_cached_identity(store) {
            Some(identity) => BootstrapPlan::Delayed(self.dashboard_for(identity.role.as_deref())),
            None => BootstrapPlan::Immediate(AUTH_LANDING.to_string()),
        }
    }

    /// Plan for the post-login entry point. The `role` query parameter is consulted
    /// only when nothing is cached; a cached identity always wins, even one whose role
    /// did not resolve.
    pub fn plan_post_login(&self, store: &dyn IdentityStore, role_hint: Option<&str>) -> BootstrapPlan {
        match (read_cached_identity(store), role_hint) {
            (Some(identity), _) => BootstrapPlan::Delayed(self.dashboard_for(identity.role.as_deref())),
            (None, Some(hint)) if !hint.is_empty() => BootstrapPlan::Delayed(self.dashboard_for(Some(hint))),
            (None, _) => BootstrapPlan::Immediate(AUTH_LANDING.to_string()),
        }
    }

    /// Executes a plan. Must be called inside a tokio runtime when the plan is delayed.
    pub fn start(&self, plan: BootstrapPlan, navigator: Arc<dyn Navigator>) -> BootstrapRun {
        match plan {
            BootstrapPlan::Immediate(target) => {
                tracing::debug!(location = %target, "bootstrap: navigating immediately");
                navigator.navigate(&target);
                BootstrapRun::Navigated(target)
            }
            BootstrapPlan::Delayed(target) => {
                BootstrapRun::Scheduled(ScheduledRedirect::schedule(target, self.delay, navigator))
            }
        }
    }

    /// Clears the cached identity, then sends the user to the auth landing page.
    pub fn logout(&self, store: &dyn IdentityStore, navigator: &dyn Navigator) {
        store.remove(TOKEN_KEY);
        store.remove(USER_KEY);
        tracing::info!("bootstrap: cached identity cleared");
        navigator.navigate(AUTH_LANDING);
    }

    /// Dashboard root for a role claim: exact match against the known roles, then the
    /// shared route table. Anything else lands on `/auth`.
    pub fn dashboard_for(&self, role: Option<&str>) -> String {
        role.and_then(DashboardRole::from_claim)
            .and_then(|role| self.policy.roles.resolve_base_path(role.as_str()))
            .unwrap_or(AUTH_LANDING)
            .to_string()
    }
}

/// How a scheduled redirect ended. Exactly one of the two ever happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    Navigated(String),
    Cancelled,
}

/// ScheduledRedirect
///
/// A navigation that fires after a delay unless cancelled first. The task races the
/// timer against a cancel signal, so it either navigates or cancels, never both.
///
/// Dropping the handle cancels the redirect: tie it to the lifetime of the hosting
/// view and teardown needs no extra code.
pub struct ScheduledRedirect {
    target: String,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<RedirectOutcome>,
}

impl ScheduledRedirect {
    pub fn schedule(target: String, delay: Duration, navigator: Arc<dyn Navigator>) -> Self {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let task_target = target.clone();

        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                // Fires on an explicit cancel and when the handle is dropped.
                _ = cancel_rx => {
                    tracing::debug!(location = %task_target, "bootstrap: scheduled redirect cancelled");
                    RedirectOutcome::Cancelled
                }
                _ = tokio::time::sleep(delay) => {
                    tracing::debug!(location = %task_target, "bootstrap: navigating after delay");
                    navigator.navigate(&task_target);
                    RedirectOutcome::Navigated(task_target)
                }
            }
        });

        Self {
            target,
            cancel: Some(cancel_tx),
            task,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the redirect and reports what actually happened. If the delay had
    /// already elapsed, the outcome is `Navigated`.
    pub async fn cancel(mut self) -> RedirectOutcome {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        self.join().await
    }

    /// Waits for the redirect to fire.
    pub async fn wait(mut self) -> RedirectOutcome {
        self.join().await
    }

    async fn join(&mut self) -> RedirectOutcome {
        // The task is never aborted, so a join error means the navigator panicked
        // and no navigation completed.
        (&mut self.task).await.unwrap_or(RedirectOutcome::Cancelled)
    }
}
