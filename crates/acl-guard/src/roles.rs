use http::header::HeaderName;
use http::Request;
use thiserror::Error;

/// Default header read by [`HeaderRoleSource`].
pub const DEFAULT_ROLES_HEADER: &str = "x-roles";

/// Errors produced by the bundled role sources.
#[derive(Debug, Error)]
pub enum RoleLookupError {
    /// Upstream authentication did not attach a [`RoleNames`] extension.
    #[error("request carries no role names; is authentication configured?")]
    MissingExtension,
    /// The roles header is present but not valid visible ASCII.
    #[error("header '{header}' is not valid visible ASCII")]
    InvalidHeader { header: HeaderName },
}

/// Supplies the role names of the requester.
///
/// Called once per request that is not bypassed, before any rule is
/// consulted. Errors are handed back to the embedder unchanged.
///
/// Any `Fn(&Request<B>) -> Result<Vec<String>, E>` closure is a role source:
///
/// ```
/// use std::convert::Infallible;
/// use acl_guard::RoleSource;
/// use http::Request;
///
/// let source = |_req: &Request<()>| Ok::<_, Infallible>(vec!["user".to_string()]);
/// let req = Request::new(());
/// assert_eq!(source.role_names(&req).unwrap(), vec!["user"]);
/// ```
pub trait RoleSource<B>: Send + Sync {
    type Error;

    fn role_names(&self, request: &Request<B>) -> Result<Vec<String>, Self::Error>;
}

impl<B, F, E> RoleSource<B> for F
where
    F: Fn(&Request<B>) -> Result<Vec<String>, E> + Send + Sync,
{
    type Error = E;

    fn role_names(&self, request: &Request<B>) -> Result<Vec<String>, E> {
        self(request)
    }
}

/// Role names attached to a request by an earlier authentication step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleNames(pub Vec<String>);

impl<S: Into<String>> FromIterator<S> for RoleNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Reads [`RoleNames`] from the request extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionRoleSource;

impl<B> RoleSource<B> for ExtensionRoleSource {
    type Error = RoleLookupError;

    fn role_names(&self, request: &Request<B>) -> Result<Vec<String>, Self::Error> {
        request
            .extensions()
            .get::<RoleNames>()
            .map(|roles| roles.0.clone())
            .ok_or(RoleLookupError::MissingExtension)
    }
}

/// Reads a comma-separated role list from a request header.
///
/// A missing header yields the configured default roles (none by default).
#[derive(Debug, Clone)]
pub struct HeaderRoleSource {
    header: HeaderName,
    default_roles: Vec<String>,
}

impl Default for HeaderRoleSource {
    fn default() -> Self {
        Self::new(HeaderName::from_static(DEFAULT_ROLES_HEADER))
    }
}

impl HeaderRoleSource {
    pub fn new(header: HeaderName) -> Self {
        Self {
            header,
            default_roles: Vec::new(),
        }
    }

    /// Roles assumed when the header is absent (e.g. `anonymous`).
    pub fn with_default_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_roles = roles.into_iter().map(Into::into).collect();
        self
    }
}

impl<B> RoleSource<B> for HeaderRoleSource {
    type Error = RoleLookupError;

    fn role_names(&self, request: &Request<B>) -> Result<Vec<String>, Self::Error> {
        let Some(value) = request.headers().get(&self.header) else {
            return Ok(self.default_roles.clone());
        };
        let value = value
            .to_str()
            .map_err(|_| RoleLookupError::InvalidHeader {
                header: self.header.clone(),
            })?;
        Ok(value
            .split(',')
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(String::from)
            .collect())
    }
}
