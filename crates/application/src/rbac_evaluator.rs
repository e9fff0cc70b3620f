use std::str::FromStr;
use std::sync::Arc;

use backoffice_core::{AppError, AppResult, SessionClaims};
use backoffice_domain::{Permission, RoleName};
use tracing::{debug, warn};

use crate::{PermissionRegistry, PermissionSet};

/// Answer given by an evaluator that has not been initialized yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UninitializedPolicy {
    /// Every check passes until a session is initialized.
    ///
    /// Keeps pre-auth UI scaffolding visible. Grants every UI action
    /// before login completes, so it must never back a security decision.
    #[default]
    FailOpen,
    /// Every check fails until a session is initialized.
    FailClosed,
}

impl UninitializedPolicy {
    /// Returns stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailOpen => "fail_open",
            Self::FailClosed => "fail_closed",
        }
    }
}

impl FromStr for UninitializedPolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fail_open" => Ok(Self::FailOpen),
            "fail_closed" => Ok(Self::FailClosed),
            _ => Err(AppError::Validation(format!(
                "unknown uninitialized policy '{value}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
struct ResolvedSession {
    claims: SessionClaims,
    role: RoleName,
    permissions: PermissionSet,
}

/// Client-side permission checks for the signed-in user.
///
/// Results only decide which UI actions are shown. The server re-checks
/// every request.
#[derive(Debug, Clone)]
pub struct RbacEvaluator {
    registry: Arc<PermissionRegistry>,
    super_role: RoleName,
    policy: UninitializedPolicy,
    session: Option<ResolvedSession>,
    generation: u64,
}

impl RbacEvaluator {
    /// Creates an uninitialized evaluator with the builtin super-role.
    #[must_use]
    pub fn new(registry: Arc<PermissionRegistry>) -> Self {
        Self {
            registry,
            super_role: RoleName::super_role(),
            policy: UninitializedPolicy::default(),
            session: None,
            generation: 0,
        }
    }

    /// Designates the role that is granted every permission.
    #[must_use]
    pub fn with_super_role(mut self, super_role: RoleName) -> Self {
        self.super_role = super_role;
        self
    }

    /// Sets the answer given before initialization.
    #[must_use]
    pub fn with_uninitialized_policy(mut self, policy: UninitializedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Decodes the token and resolves the caller's permissions.
    ///
    /// On failure the previous session, if any, is kept untouched.
    pub fn try_initialize(&mut self, token: Option<&str>) -> AppResult<&SessionClaims> {
        let token = token
            .ok_or_else(|| AppError::Unauthorized("session token is missing".to_owned()))?;
        let claims = SessionClaims::decode_unverified(token)?;
        let role = RoleName::new(claims.role()).map_err(|error| {
            AppError::Unauthorized(format!("session role claim is invalid: {error}"))
        })?;
        let permissions = self.registry.resolve(role.as_str());

        debug!(
            user_id = %claims.user_id(),
            role = %role,
            permission_count = permissions.len(),
            "rbac session initialized"
        );

        self.generation = self.generation.saturating_add(1);
        let session = self.session.insert(ResolvedSession {
            claims,
            role,
            permissions,
        });

        Ok(&session.claims)
    }

    /// Boolean form of [`Self::try_initialize`]; failures are logged.
    pub fn initialize(&mut self, token: Option<&str>) -> bool {
        match self.try_initialize(token) {
            Ok(_) => true,
            Err(error) => {
                warn!(error = %error, "rbac session initialization failed");
                false
            }
        }
    }

    /// Drops the current session, returning to the uninitialized state.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            self.generation = self.generation.saturating_add(1);
        }
    }

    /// Returns whether a session has been initialized.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Counter bumped whenever the resolved session changes.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the decoded claims of the current session.
    #[must_use]
    pub fn claims(&self) -> Option<&SessionClaims> {
        self.session.as_ref().map(|session| &session.claims)
    }

    /// Returns the normalized role of the current session.
    #[must_use]
    pub fn role(&self) -> Option<&RoleName> {
        self.session.as_ref().map(|session| &session.role)
    }

    /// Returns whether the current session expired at `now` (unix seconds).
    #[must_use]
    pub fn is_session_expired_at(&self, now: i64) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.claims.is_expired_at(now))
    }

    /// Returns whether the caller holds `permission`.
    ///
    /// Arbitrary strings are accepted; malformed permission names are never
    /// granted except to the super-role.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        let Some(session) = &self.session else {
            return self.policy == UninitializedPolicy::FailOpen;
        };

        if session.role == self.super_role {
            return true;
        }

        Permission::from_str(permission)
            .is_ok_and(|permission| session.permissions.contains(&permission))
    }

    /// Returns whether the caller holds at least one of `permissions`.
    #[must_use]
    pub fn has_any<I, S>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        permissions
            .into_iter()
            .any(|permission| self.has_permission(permission.as_ref()))
    }

    /// Returns whether the caller holds every one of `permissions`.
    #[must_use]
    pub fn has_all<I, S>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        permissions
            .into_iter()
            .all(|permission| self.has_permission(permission.as_ref()))
    }

    /// Fails with [`AppError::Forbidden`] when `permission` is not held.
    pub fn require(&self, permission: &Permission) -> AppResult<()> {
        if self.has_permission(permission.as_str()) {
            return Ok(());
        }

        let role = self.role().map_or("anonymous", RoleName::as_str);
        Err(AppError::Forbidden(format!(
            "role '{role}' is missing permission '{permission}'"
        )))
    }
}
