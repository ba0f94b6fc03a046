//! Role to permission resolution and requirement evaluation.
//!
//! A role's permission set is resolved from the store on every check; there
//! is no cache, so a grant or revocation takes effect on the next request.

pub mod queries;

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::store::{PermissionStore, StoreResult};

/// The permission codes held by one role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    codes: HashSet<String>,
}

impl PermissionSet {
    pub fn new(codes: HashSet<String>) -> Self {
        Self { codes }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// What a route demands of the caller's role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// The role holds this code.
    One(String),
    /// The role holds at least one of these codes. Never satisfied when empty.
    Any(Vec<String>),
    /// The role holds every one of these codes. Satisfied when empty.
    All(Vec<String>),
}

impl Requirement {
    pub fn one(code: impl Into<String>) -> Self {
        Self::One(code.into())
    }

    pub fn any<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Any(codes.into_iter().map(Into::into).collect())
    }

    pub fn all<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::All(codes.into_iter().map(Into::into).collect())
    }

    pub fn is_satisfied_by(&self, held: &PermissionSet) -> bool {
        match self {
            Self::One(code) => held.contains(code),
            Self::Any(codes) => codes.iter().any(|c| held.contains(c)),
            Self::All(codes) => codes.iter().all(|c| held.contains(c)),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(code) => write!(f, "{code}"),
            Self::Any(codes) => write!(f, "any of [{}]", codes.join(", ")),
            Self::All(codes) => write!(f, "all of [{}]", codes.join(", ")),
        }
    }
}

/// Load the permission set for `role`. An unknown role resolves to the
/// empty set.
pub async fn resolve_role_permissions<S>(store: &S, role: &str) -> StoreResult<PermissionSet>
where
    S: PermissionStore + ?Sized,
{
    let codes = store.role_permission_codes(role).await?;
    debug!(role, count = codes.len(), "resolved role permissions");
    Ok(PermissionSet::new(codes))
}

/// Whether `role` currently holds `code`.
pub async fn has_permission<S>(store: &S, role: &str, code: &str) -> StoreResult<bool>
where
    S: PermissionStore + ?Sized,
{
    Ok(resolve_role_permissions(store, role).await?.contains(code))
}

/// Evaluate `requirement` against `role` with a single store lookup.
pub async fn check_requirement<S>(
    store: &S,
    role: &str,
    requirement: &Requirement,
) -> StoreResult<bool>
where
    S: PermissionStore + ?Sized,
{
    let held = resolve_role_permissions(store, role).await?;
    Ok(requirement.is_satisfied_by(&held))
}
