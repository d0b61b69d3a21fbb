use crate::compiler::CompiledRule;

/// Check whether `rule` applies to a request.
///
/// `path` and `method` must already be lower-cased; the evaluator does this
/// once per request. All conditions the rule sets must hold:
///
/// * the path pattern is *found* somewhere in `path` (authors anchor with `^`
///   themselves),
/// * `method` is one of the rule's methods,
/// * `role_names` contains the rule's role, compared case-sensitively.
///
/// A rule that sets no condition matches everything.
pub fn rule_matches(rule: &CompiledRule, path: &str, method: &str, role_names: &[String]) -> bool {
    if let Some(pattern) = &rule.path_pattern {
        if !pattern.is_match(path) {
            return false;
        }
    }

    if let Some(methods) = &rule.methods {
        if !methods.contains(method) {
            return false;
        }
    }

    match &rule.role {
        Some(role) => has_role(role_names, role),
        None => true,
    }
}

/// Exact membership test over the requester's role names.
pub fn has_role(role_names: &[String], role: &str) -> bool {
    role_names.iter().any(|r| r == role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_rule;
    use crate::schema::{AclRule, RuleAction};

    fn compiled(rule: AclRule) -> CompiledRule {
        compile_rule(0, &rule.action(RuleAction::Accept)).unwrap()
    }

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn wildcard_matches_everything() {
        let rule = compiled(AclRule::new());
        assert!(rule_matches(&rule, "/", "get", &[]));
        assert!(rule_matches(&rule, "/anything/at/all", "delete", &roles(&["x"])));
    }

    #[test]
    fn path_is_an_unanchored_search() {
        let rule = compiled(AclRule::new().path("apple"));
        assert!(rule_matches(&rule, "/fruit/apple/big", "get", &[]));
        assert!(!rule_matches(&rule, "/banana/", "get", &[]));

        let anchored = compiled(AclRule::new().path("^/apple/"));
        assert!(anchored.path_pattern.is_some());
        assert!(rule_matches(&anchored, "/apple/big", "get", &[]));
        assert!(!rule_matches(&anchored, "/fruit/apple/", "get", &[]));
    }

    #[test]
    fn method_membership() {
        let rule = compiled(AclRule::new().methods(["GET", "head"]));
        assert!(rule_matches(&rule, "/", "get", &[]));
        assert!(rule_matches(&rule, "/", "head", &[]));
        assert!(!rule_matches(&rule, "/", "post", &[]));
    }

    #[test]
    fn role_is_case_sensitive() {
        let rule = compiled(AclRule::new().role("auser"));
        assert!(rule_matches(&rule, "/", "get", &roles(&["other", "auser"])));
        assert!(!rule_matches(&rule, "/", "get", &roles(&["AUser"])));
        assert!(!rule_matches(&rule, "/", "get", &[]));
    }

    #[test]
    fn every_condition_must_hold() {
        let rule = compiled(AclRule::new().path("^/apple/").role("user").methods(["get"]));
        let user = roles(&["user"]);
        assert!(rule_matches(&rule, "/apple/", "get", &user));
        assert!(!rule_matches(&rule, "/apple/", "post", &user));
        assert!(!rule_matches(&rule, "/banana/", "get", &user));
        assert!(!rule_matches(&rule, "/apple/", "get", &roles(&["manager"])));
    }
}
