use std::sync::Arc;

use acl_engine::{
    AccessControl, AccessDecision, AccessRequest, AclConfig, AclRule, ConfigurationError,
    UnlessConfig,
};
use http::{Request, Response, StatusCode};
use tracing::{debug, info, trace};

use crate::bypass::Bypass;
use crate::roles::RoleSource;

/// What the embedder should do with a request after the guard looked at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// A bypass predicate matched; no roles were looked up, no rule consulted.
    Bypassed,
    /// Access granted; continue normal processing.
    Continue(AccessDecision),
    /// Access denied; answer with `403 Forbidden` and stop.
    Forbidden(AccessDecision),
}

impl GuardOutcome {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, GuardOutcome::Forbidden(_))
    }

    /// The evaluator's decision, unless the request was bypassed.
    pub fn decision(&self) -> Option<&AccessDecision> {
        match self {
            GuardOutcome::Bypassed => None,
            GuardOutcome::Continue(d) | GuardOutcome::Forbidden(d) => Some(d),
        }
    }

    /// HTTP status the outcome maps to.
    pub fn status(&self) -> StatusCode {
        if self.is_allowed() {
            StatusCode::OK
        } else {
            StatusCode::FORBIDDEN
        }
    }

    /// The short-circuit response for a denied request, `None` otherwise.
    pub fn into_response(self) -> Option<Response<String>> {
        match self {
            GuardOutcome::Forbidden(_) => Some(forbidden_response()),
            _ => None,
        }
    }
}

/// A bare `403 Forbidden` response.
pub fn forbidden_response() -> Response<String> {
    let mut response = Response::new(
        StatusCode::FORBIDDEN
            .canonical_reason()
            .unwrap_or("Forbidden")
            .to_string(),
    );
    *response.status_mut() = StatusCode::FORBIDDEN;
    response
}

// ---------------------------------------------------------------------------
// AclGuard
// ---------------------------------------------------------------------------

/// Access control at the request boundary.
///
/// Built with [`AclGuardBuilder`]. For each request the guard checks the
/// bypass predicates, asks the [`RoleSource`] for role names and then
/// evaluates the compiled rules.
pub struct AclGuard<R> {
    acl: Arc<AccessControl>,
    bypass: Bypass,
    roles: R,
}

impl<R> std::fmt::Debug for AclGuard<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclGuard")
            .field("acl", &self.acl)
            .field("bypass_predicates", &self.bypass.len())
            .finish()
    }
}

impl<R> AclGuard<R> {
    pub fn builder() -> AclGuardBuilder<R> {
        AclGuardBuilder::default()
    }

    /// The compiled rules shared by this guard.
    pub fn access_control(&self) -> &Arc<AccessControl> {
        &self.acl
    }

    pub fn bypass(&self) -> &Bypass {
        &self.bypass
    }

    /// Check `request`.
    ///
    /// Role lookup failures are returned as-is; the guard never turns them
    /// into a decision.
    pub fn check<B>(&self, request: &Request<B>) -> Result<GuardOutcome, R::Error>
    where
        R: RoleSource<B>,
    {
        let path = request.uri().path();
        let method = request.method().as_str();

        if self.bypass.skips(path, method) {
            trace!(path, method, "request bypasses access control");
            return Ok(GuardOutcome::Bypassed);
        }

        let role_names = self.roles.role_names(request)?;
        Ok(self.check_with_roles(path, method, &role_names))
    }

    /// Evaluate with role names the caller already resolved, e.g. through an
    /// asynchronous lookup. Bypass predicates are not consulted.
    pub fn check_with_roles(&self, path: &str, method: &str, role_names: &[String]) -> GuardOutcome {
        let decision = self
            .acl
            .evaluate(&AccessRequest::new(path, method, role_names));

        if decision.is_accept() {
            debug!(path, method, roles = ?role_names, %decision, "access granted");
            GuardOutcome::Continue(decision)
        } else {
            info!(path, method, roles = ?role_names, %decision, "access denied");
            GuardOutcome::Forbidden(decision)
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects the guard's options; [`build`](Self::build) validates them.
pub struct AclGuardBuilder<R> {
    role_source: Option<R>,
    rules: Option<Vec<AclRule>>,
    unless: UnlessConfig,
}

impl<R> Default for AclGuardBuilder<R> {
    fn default() -> Self {
        Self {
            role_source: None,
            rules: None,
            unless: UnlessConfig::default(),
        }
    }
}

impl<R> AclGuardBuilder<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collaborator that resolves role names. Required.
    pub fn role_source(mut self, source: R) -> Self {
        self.role_source = Some(source);
        self
    }

    /// The ordered rule list. Required and must not be empty.
    pub fn rules(mut self, rules: Vec<AclRule>) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Requests that skip access control entirely.
    pub fn unless(mut self, unless: UnlessConfig) -> Self {
        self.unless = unless;
        self
    }

    /// Take both the rules and the bypass predicates from a loaded document.
    pub fn config(self, config: AclConfig) -> Self {
        self.rules(config.rules).unless(config.unless)
    }

    pub fn build(self) -> Result<AclGuard<R>, ConfigurationError> {
        let roles = self
            .role_source
            .ok_or(ConfigurationError::MissingRoleSource)?;
        let rules = self.rules.ok_or(ConfigurationError::EmptyRules)?;
        let acl = AccessControl::new(&rules)?;
        let bypass = Bypass::from_config(&self.unless)?;

        debug!(
            num_rules = acl.rules().len(),
            bypass_predicates = bypass.len(),
            "ACL guard built"
        );

        Ok(AclGuard {
            acl: Arc::new(acl),
            bypass,
            roles,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
