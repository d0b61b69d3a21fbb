use tracing::{debug, trace};

use crate::compiler::{self, CompiledRule};
use crate::decision::{AccessDecision, Verdict};
use crate::error::ConfigurationError;
use crate::matcher::{has_role, rule_matches};
use crate::schema::{AclConfig, AclRule};

/// Role that is granted every request without consulting any rule.
///
/// The override is fixed; it cannot be disabled or renamed through
/// configuration.
pub const ADMIN_ROLE: &str = "admin";

/// Everything the evaluator needs to know about one request.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub path: &'a str,
    pub method: &'a str,
    pub role_names: &'a [String],
}

impl<'a> AccessRequest<'a> {
    pub fn new(path: &'a str, method: &'a str, role_names: &'a [String]) -> Self {
        Self {
            path,
            method,
            role_names,
        }
    }
}

// ---------------------------------------------------------------------------
// AccessControl
// ---------------------------------------------------------------------------

/// An immutable, ordered list of compiled rules.
///
/// Construct via [`AccessControl::new`]. Evaluation takes `&self` and touches
/// no shared mutable state, so one instance can serve any number of threads
/// behind an `Arc`.
pub struct AccessControl {
    rules: Vec<CompiledRule>,
}

impl std::fmt::Debug for AccessControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessControl")
            .field("num_rules", &self.rules.len())
            .finish()
    }
}

impl AccessControl {
    /// Validate and compile `rules`.
    ///
    /// Fails if the list is empty, if any rule lacks an action, or if any
    /// path pattern is not a valid regular expression.
    pub fn new(rules: &[AclRule]) -> Result<Self, ConfigurationError> {
        if rules.is_empty() {
            return Err(ConfigurationError::EmptyRules);
        }
        let rules = compiler::compile(rules)?;
        debug!(num_rules = rules.len(), "access control rules compiled");
        Ok(Self { rules })
    }

    /// Build from the rule list of a loaded [`AclConfig`].
    pub fn from_config(config: &AclConfig) -> Result<Self, ConfigurationError> {
        Self::new(&config.rules)
    }

    /// The compiled rules, in evaluation order.
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Accept or reject the request.
    pub fn decide(&self, request: &AccessRequest<'_>) -> Verdict {
        self.evaluate(request).verdict
    }

    /// Like [`decide`](Self::decide), but also reports which rule decided.
    pub fn evaluate(&self, request: &AccessRequest<'_>) -> AccessDecision {
        evaluate(
            &self.rules,
            request.path,
            request.method,
            request.role_names,
        )
    }
}

/// Accept or reject a request against an ordered rule list.
pub fn decide(rules: &[CompiledRule], path: &str, method: &str, role_names: &[String]) -> Verdict {
    evaluate(rules, path, method, role_names).verdict
}

/// First-match-wins evaluation with admin override and default deny.
pub fn evaluate(
    rules: &[CompiledRule],
    path: &str,
    method: &str,
    role_names: &[String],
) -> AccessDecision {
    let path = path.to_lowercase();
    let method = method.to_lowercase();

    if has_role(role_names, ADMIN_ROLE) {
        trace!(%path, "admin override");
        return AccessDecision::admin_override();
    }

    for rule in rules {
        if rule_matches(rule, &path, &method, role_names) {
            trace!(rule = %rule.label(), action = %rule.action, %path, %method, "rule matched");
            return AccessDecision::matched(rule.index, rule.name.clone(), rule.action);
        }
    }

    trace!(%path, %method, "no rule matched");
    AccessDecision::default_deny()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
