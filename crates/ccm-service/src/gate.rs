// SPDX-License-Identifier: BUSL-1.1
//! # Authorization Gate
//!
//! The external capability check consumed before updates and deletes of
//! existing documents. The gate itself (an OIDC userinfo lookup, an IAM
//! service,
//! whatever) lives outside this core; what's fixed here is the contract:
//!
//! - queried fresh on every mutating call — a role decision is never
//!   cached, because membership can change between requests and a stale
//!   "allowed" is a security defect;
//! - **fail-closed** — a gate that cannot answer (network error, timeout,
//!   malformed identity) denies. [`authorize()`] is the single place that
//!   rule is applied, so no call site can get it wrong.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use ccm_core::{Identity, Role};

/// Errors a gate implementation can surface.
///
/// Every one of these resolves to [`Decision::Denied`] — the variants
/// exist so operators can tell "denied" apart from "gate down" in logs.
#[derive(Error, Debug)]
pub enum GateError {
    /// The authorization backend could not be reached.
    #[error("authorization gate unreachable: {0}")]
    Unreachable(String),

    /// The gate did not answer within its deadline.
    #[error("authorization gate timed out after {waited_ms}ms")]
    Timeout {
        /// How long the caller waited before giving up.
        waited_ms: u64,
    },

    /// The identity could not be presented to the gate.
    #[error("malformed identity: {0}")]
    MalformedIdentity(String),
}

/// The outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The identity holds the required role.
    Allowed,
    /// The identity lacks the role, or the gate could not be consulted.
    Denied,
}

/// Answers whether an identity holds a named role.
///
/// Implementations must not cache affirmative answers across calls.
pub trait RoleGate: Send + Sync {
    /// Whether `identity` currently holds `role`.
    fn has_role(&self, identity: &Identity, role: &Role) -> Result<bool, GateError>;
}

impl<T: RoleGate + ?Sized> RoleGate for std::sync::Arc<T> {
    fn has_role(&self, identity: &Identity, role: &Role) -> Result<bool, GateError> {
        (**self).has_role(identity, role)
    }
}

/// Consult the gate, fail-closed.
///
/// `Ok(true)` is the only path to [`Decision::Allowed`]. A transport
/// error is logged (so "gate down" is visible to operators) and denied.
pub fn authorize(gate: &dyn RoleGate, identity: &Identity, role: &Role) -> Decision {
    match gate.has_role(identity, role) {
        Ok(true) => Decision::Allowed,
        Ok(false) => Decision::Denied,
        Err(err) => {
            tracing::warn!(
                subject = %identity.subject(),
                role = %role,
                error = %err,
                "authorization gate failure treated as denial"
            );
            Decision::Denied
        }
    }
}

/// A static in-memory gate: an explicit subject → roles table.
///
/// Ships for tests and embedded deployments where role assignments are
/// part of configuration rather than an external service.
#[derive(Debug, Clone, Default)]
pub struct StaticRoleGate {
    grants: HashMap<String, HashSet<String>>,
}

impl StaticRoleGate {
    /// Create a gate with no grants — it denies everyone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `role` to `subject`. Builder-style.
    pub fn grant(mut self, subject: impl Into<String>, role: &Role) -> Self {
        self.grants
            .entry(subject.into())
            .or_default()
            .insert(role.as_str().to_string());
        self
    }
}

impl RoleGate for StaticRoleGate {
    fn has_role(&self, identity: &Identity, role: &Role) -> Result<bool, GateError> {
        Ok(self
            .grants
            .get(identity.subject())
            .is_some_and(|roles| roles.contains(role.as_str())))
    }
}
