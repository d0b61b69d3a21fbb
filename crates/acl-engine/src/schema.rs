use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level ACL document, usually loaded from YAML by [`crate::loader`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AclConfig {
    /// Ordered rule list. Declaration order is evaluation order.
    #[serde(default, alias = "acl", alias = "acls")]
    pub rules: Vec<AclRule>,
    /// Requests matching these predicates skip access control entirely.
    #[serde(default)]
    pub unless: UnlessConfig,
}

/// A single raw rule declaration.
///
/// Every condition is optional; a rule that sets none of `path`, `role` and
/// `methods` matches every request. `action` is optional here only so that a
/// missing action can be reported as a configuration error with the rule's
/// position instead of a bare deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AclRule {
    /// Optional label used in logs and decision reasons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Regular expression searched (unanchored) in the request path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Role name the requester must hold. Compared exactly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// HTTP methods this rule applies to, case-insensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<RuleAction>,
}

impl AclRule {
    /// Start an empty (wildcard, action-less) rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a wildcard rule with the given action.
    pub fn any(action: RuleAction) -> Self {
        Self::new().action(action)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn path(mut self, pattern: impl Into<String>) -> Self {
        self.path = Some(pattern.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    pub fn action(mut self, action: RuleAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// What happens when a rule is the first one to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum RuleAction {
    /// Let the request through.
    Accept,
    /// Deny the request and stop evaluating.
    Reject,
}

impl FromStr for RuleAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("accept") {
            Ok(RuleAction::Accept)
        } else if s.eq_ignore_ascii_case("reject") {
            Ok(RuleAction::Reject)
        } else {
            Err(UnknownAction(s.to_string()))
        }
    }
}

impl TryFrom<String> for RuleAction {
    type Error = UnknownAction;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleAction::Accept => f.write_str("accept"),
            RuleAction::Reject => f.write_str("reject"),
        }
    }
}

/// Returned when an action string is neither `accept` nor `reject`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule action '{0}'; expected 'accept' or 'reject'")]
pub struct UnknownAction(pub String);

/// Predicates that bypass access control before roles are even looked up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnlessConfig {
    #[serde(default)]
    pub paths: Vec<PathPredicate>,
    /// Methods that are never checked (e.g. `OPTIONS` for CORS preflight).
    #[serde(default)]
    pub methods: Vec<String>,
}

impl UnlessConfig {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.methods.is_empty()
    }
}

/// A typed path predicate used by [`UnlessConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathPredicate {
    /// The request path must equal `path` exactly.
    Exact { path: String },
    /// Regular expression searched in the request path.
    Regex { pattern: String },
    /// Glob with `*`, `**`, `?` and character classes.
    Glob { pattern: String },
}
