use std::fmt;

use serde::Serialize;

use crate::schema::RuleAction;

/// The final answer for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    Reject,
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

impl From<RuleAction> for Verdict {
    fn from(action: RuleAction) -> Self {
        match action {
            RuleAction::Accept => Verdict::Accept,
            RuleAction::Reject => Verdict::Reject,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => f.write_str("accept"),
            Verdict::Reject => f.write_str("reject"),
        }
    }
}

/// Why a [`Verdict`] was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// The requester holds the reserved admin role.
    AdminOverride,
    /// A rule matched; see [`AccessDecision::matched_rule`].
    MatchedRule,
    /// Nothing matched and the default-deny policy applied.
    NoRuleMatched,
}

/// The outcome of evaluating a request against the compiled rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub verdict: Verdict,
    pub reason: DecisionReason,
    /// Index of the rule that decided, if any.
    pub matched_rule: Option<usize>,
    /// Name of the rule that decided, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
}

impl AccessDecision {
    /// Decision granted by the admin override.
    pub fn admin_override() -> Self {
        Self {
            verdict: Verdict::Accept,
            reason: DecisionReason::AdminOverride,
            matched_rule: None,
            rule_name: None,
        }
    }

    /// Decision taken by the default-deny policy.
    pub fn default_deny() -> Self {
        Self {
            verdict: Verdict::Reject,
            reason: DecisionReason::NoRuleMatched,
            matched_rule: None,
            rule_name: None,
        }
    }

    /// Decision taken by the rule at `index`.
    pub fn matched(index: usize, name: Option<String>, action: RuleAction) -> Self {
        Self {
            verdict: action.into(),
            reason: DecisionReason::MatchedRule,
            matched_rule: Some(index),
            rule_name: name,
        }
    }

    pub fn is_accept(&self) -> bool {
        self.verdict.is_accept()
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.reason, &self.rule_name, self.matched_rule) {
            (DecisionReason::AdminOverride, _, _) => write!(f, "{} (admin override)", self.verdict),
            (DecisionReason::MatchedRule, Some(name), _) => {
                write!(f, "{} (matched rule '{}')", self.verdict, name)
            }
            (DecisionReason::MatchedRule, None, Some(index)) => {
                write!(f, "{} (matched rule #{})", self.verdict, index)
            }
            _ => write!(f, "{} (no rule matched)", self.verdict),
        }
    }
}
