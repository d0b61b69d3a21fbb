//! # acl-engine
//!
//! Route access control for HTTP-style requests.  An ordered list of rules is
//! compiled once; each request (path, method, role names) is then checked
//! against it with first-match-wins semantics and a default-deny fallback.
//! Requesters holding [`ADMIN_ROLE`] bypass the rules entirely.
//!
//! ## Quick start
//!
//! ```rust
//! use acl_engine::{AccessControl, AccessRequest, AclRule, RuleAction, Verdict};
//!
//! let acl = AccessControl::new(&[
//!     AclRule::new().role("baduser").action(RuleAction::Reject),
//!     AclRule::new().path("^/apple/").methods(["get"]).action(RuleAction::Accept),
//! ])
//! .unwrap();
//!
//! let roles = vec!["user".to_string()];
//! let verdict = acl.decide(&AccessRequest::new("/apple/big", "GET", &roles));
//! assert_eq!(verdict, Verdict::Accept);
//! ```

pub mod compiler;
mod decision;
mod error;
mod evaluator;
pub mod loader;
pub mod matcher;
mod schema;

// Re-export primary public API at crate root.
pub use compiler::CompiledRule;
pub use decision::{AccessDecision, DecisionReason, Verdict};
pub use error::ConfigurationError;
pub use evaluator::{decide, evaluate, AccessControl, AccessRequest, ADMIN_ROLE};
pub use schema::{AclConfig, AclRule, PathPredicate, RuleAction, UnknownAction, UnlessConfig};
