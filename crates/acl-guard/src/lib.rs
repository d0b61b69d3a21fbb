//! Request-boundary adapter for [`acl_engine`].
//!
//! The guard sits in front of request handling and turns each
//! [`http::Request`] into one of three outcomes:
//!
//! ```text
//! request ──► [Bypass] ──skip──► Bypassed
//!                │
//!                ▼
//!          [RoleSource] ──error──► returned to the caller
//!                │
//!                ▼
//!          [AccessControl] ──► Continue | Forbidden (403)
//! ```
//!
//! # Example
//!
//! ```rust
//! use acl_engine::{AclRule, RuleAction};
//! use acl_guard::{AclGuard, ExtensionRoleSource, RoleNames};
//! use http::{Request, StatusCode};
//!
//! let guard = AclGuard::builder()
//!     .role_source(ExtensionRoleSource)
//!     .rules(vec![
//!         AclRule::new().path("^/apple/").role("auser").action(RuleAction::Accept),
//!     ])
//!     .build()
//!     .unwrap();
//!
//! let req = Request::builder()
//!     .uri("/banana/")
//!     .extension(RoleNames::from_iter(["auser"]))
//!     .body(())
//!     .unwrap();
//! assert_eq!(guard.check(&req).unwrap().status(), StatusCode::FORBIDDEN);
//! ```

pub mod bypass;
pub mod guard;
pub mod roles;

// Re-export the primary public types at the crate root for convenience.
pub use bypass::Bypass;
pub use guard::{forbidden_response, AclGuard, AclGuardBuilder, GuardOutcome};
pub use roles::{
    ExtensionRoleSource, HeaderRoleSource, RoleLookupError, RoleNames,
    RoleSource, DEFAULT_ROLES_HEADER,
};
