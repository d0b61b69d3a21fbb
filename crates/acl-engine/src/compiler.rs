use std::collections::HashSet;

use regex::Regex;
use tracing::trace;

use crate::error::ConfigurationError;
use crate::schema::{AclRule, RuleAction};

/// An [`AclRule`] after validation and pattern compilation.
///
/// Plain immutable data; matching lives in [`crate::matcher::rule_matches`].
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub(crate) index: usize,
    pub(crate) name: Option<String>,
    /// Compiled from the lower-cased source text. `None` matches any path.
    pub(crate) path_pattern: Option<Regex>,
    pub(crate) role: Option<String>,
    /// Lower-cased method names. `None` matches any method.
    pub(crate) methods: Option<HashSet<String>>,
    pub(crate) action: RuleAction,
}

impl CompiledRule {
    /// Position of the rule in the declared list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn action(&self) -> RuleAction {
        self.action
    }

    /// The lower-cased pattern source, if the rule constrains the path.
    ///
    /// The whole source text is lower-cased, escapes included, so upper-case
    /// escapes change meaning: `\D`, `\W`, `\S` and `\P{..}` become their
    /// positive forms and `\A` becomes the bell escape `\a`. Use `^`, or a
    /// negated class such as `[^0-9]`, instead.
    pub fn path_pattern(&self) -> Option<&str> {
        self.path_pattern.as_ref().map(Regex::as_str)
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// A label for logs: the rule name, or its position.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{}", self.index),
        }
    }
}

/// Compile an ordered list of raw rules, preserving order.
///
/// Stops at the first invalid rule; nothing is returned for the rules that
/// compiled before it. Rule names, when given, must be non-empty and unique.
pub fn compile(rules: &[AclRule]) -> Result<Vec<CompiledRule>, ConfigurationError> {
    let mut seen = HashSet::new();
    rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            if let Some(name) = &rule.name {
                if name.is_empty() {
                    return Err(ConfigurationError::EmptyRuleName { index });
                }
                if !seen.insert(name.as_str()) {
                    return Err(ConfigurationError::DuplicateRuleName { name: name.clone() });
                }
            }
            compile_rule(index, rule)
        })
        .collect()
}

/// Compile a single rule declared at position `index`.
///
/// An empty `role` is treated as no role condition at all.
pub fn compile_rule(index: usize, rule: &AclRule) -> Result<CompiledRule, ConfigurationError> {
    let action = rule
        .action
        .ok_or(ConfigurationError::MissingAction { index })?;

    let path_pattern = rule
        .path
        .as_deref()
        .map(|pattern| {
            let lowered = pattern.to_lowercase();
            Regex::new(&lowered).map_err(|source| ConfigurationError::InvalidPathPattern {
                index,
                pattern: pattern.to_string(),
                source,
            })
        })
        .transpose()?;

    let methods = rule
        .methods
        .as_ref()
        .map(|methods| methods.iter().map(|m| m.to_lowercase()).collect());

    let compiled = CompiledRule {
        index,
        name: rule.name.clone(),
        path_pattern,
        role: rule.role.clone().filter(|role| !role.is_empty()),
        methods,
        action,
    };
    trace!(rule = %compiled.label(), %action, "compiled ACL rule");
    Ok(compiled)
}
