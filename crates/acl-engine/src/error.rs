use thiserror::Error;

/// Raised while building an evaluator or guard. No partially built value is
/// ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No role-name collaborator was supplied.
    #[error("a role source must be provided")]
    MissingRoleSource,

    /// The rule list was absent or empty.
    #[error("acl must be a non-empty list of rules")]
    EmptyRules,

    /// A rule was declared without an action.
    #[error("action must be set in ACL rule #{index}")]
    MissingAction { index: usize },

    #[error("rule name must not be empty (ACL rule #{index})")]
    EmptyRuleName { index: usize },

    #[error("duplicate rule name: '{name}'")]
    DuplicateRuleName { name: String },

    /// A rule's `path` is not a valid regular expression.
    #[error("invalid path pattern '{pattern}' in ACL rule #{index}: {source}")]
    InvalidPathPattern {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A bypass predicate could not be compiled.
    #[error("invalid bypass pattern '{pattern}': {reason}")]
    InvalidBypassPattern { pattern: String, reason: String },
}
