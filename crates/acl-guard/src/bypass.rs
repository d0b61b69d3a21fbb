use std::collections::HashSet;

use acl_engine::{ConfigurationError, PathPredicate, UnlessConfig};
use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;

/// A pre-compiled [`PathPredicate`].
#[derive(Debug, Clone)]
enum CompiledPredicate {
    Exact(String),
    Regex(Regex),
    Glob(GlobMatcher),
}

impl CompiledPredicate {
    fn is_match(&self, path: &str) -> bool {
        match self {
            CompiledPredicate::Exact(expected) => expected == path,
            CompiledPredicate::Regex(regex) => regex.is_match(path),
            CompiledPredicate::Glob(glob) => glob.is_match(path),
        }
    }
}

/// Requests for which access control is skipped altogether, before the role
/// source is even called.
///
/// Path predicates see the raw request path (no query string) and are
/// case-sensitive. In globs `*` stays within one path segment; use `**` to
/// cross `/`. Methods are compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Bypass {
    paths: Vec<CompiledPredicate>,
    methods: HashSet<String>,
}

impl Bypass {
    /// A bypass that never skips anything.
    pub fn none() -> Self {
        Self::default()
    }

    /// Compile every predicate in `config`.
    pub fn from_config(config: &UnlessConfig) -> Result<Self, ConfigurationError> {
        let paths = config
            .paths
            .iter()
            .map(compile_predicate)
            .collect::<Result<Vec<_>, _>>()?;
        let methods = config.methods.iter().map(|m| m.to_lowercase()).collect();
        Ok(Self { paths, methods })
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.methods.is_empty()
    }

    /// Number of path predicates plus bypassed methods.
    pub fn len(&self) -> usize {
        self.paths.len() + self.methods.len()
    }

    /// True when the request should not be checked at all.
    pub fn skips(&self, path: &str, method: &str) -> bool {
        if !self.methods.is_empty() && self.methods.contains(&method.to_lowercase()) {
            return true;
        }
        self.paths.iter().any(|p| p.is_match(path))
    }
}

fn compile_predicate(predicate: &PathPredicate) -> Result<CompiledPredicate, ConfigurationError> {
    match predicate {
        PathPredicate::Exact { path } => Ok(CompiledPredicate::Exact(path.clone())),
        PathPredicate::Regex { pattern } => Regex::new(pattern)
            .map(CompiledPredicate::Regex)
            .map_err(|e| ConfigurationError::InvalidBypassPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            }),
        PathPredicate::Glob { pattern } => GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map(|glob| CompiledPredicate::Glob(glob.compile_matcher()))
            .map_err(|e| ConfigurationError::InvalidBypassPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bypass(paths: Vec<PathPredicate>, methods: &[&str]) -> Bypass {
        Bypass::from_config(&UnlessConfig {
            paths,
            methods: methods.iter().map(|m| m.to_string()).collect(),
        })
        .unwrap()
    }

    #[test]
    fn empty_bypass_skips_nothing() {
        let b = Bypass::none();
        assert!(b.is_empty());
        assert!(!b.skips("/public/", "GET"));
    }

    #[test]
    fn regex_predicate() {
        let b = bypass(
            vec![PathPredicate::Regex {
                pattern: "^/public/".into(),
            }],
            &[],
        );
        assert!(b.skips("/public/", "GET"));
        assert!(b.skips("/public/index.html", "POST"));
        assert!(!b.skips("/apple/", "GET"));
        assert!(!b.skips("/PUBLIC/", "GET"));
    }

    #[test]
    fn exact_predicate() {
        let b = bypass(
            vec![PathPredicate::Exact {
                path: "/healthz".into(),
            }],
            &[],
        );
        assert!(b.skips("/healthz", "GET"));
        assert!(!b.skips("/healthz/deep", "GET"));
    }

    #[test]
    fn glob_predicate() {
        let b = bypass(
            vec![PathPredicate::Glob {
                pattern: "/static/**".into(),
            }],
            &[],
        );
        assert!(b.skips("/static/css/site.css", "GET"));
        assert!(!b.skips("/api/static", "GET"));
    }

    #[test]
    fn glob_star_stays_in_one_segment() {
        let b = bypass(
            vec![PathPredicate::Glob {
                pattern: "/static/*".into(),
            }],
            &[],
        );
        assert!(b.skips("/static/site.css", "GET"));
        assert!(!b.skips("/static/css/site.css", "GET"));
    }

    #[test]
    fn methods_are_case_insensitive() {
        let b = bypass(vec![], &["OPTIONS"]);
        assert_eq!(b.len(), 1);
        assert!(b.skips("/anything", "options"));
        assert!(!b.skips("/anything", "GET"));
    }

    #[test]
    fn invalid_patterns_are_configuration_errors() {
        let err = Bypass::from_config(&UnlessConfig {
            paths: vec![PathPredicate::Regex {
                pattern: "(".into(),
            }],
            methods: vec![],
        })
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidBypassPattern { .. }));

        let err = Bypass::from_config(&UnlessConfig {
            paths: vec![PathPredicate::Glob {
                pattern: "/a/[".into(),
            }],
            methods: vec![],
        })
        .unwrap_err();
        assert!(
            err.to_string().contains("/a/["),
            "error should mention the pattern: {err}"
        );
    }
}
