//! Project identity: the token that names a deployment and doubles as the
//! request subdomain at serve time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque, URL-safe token identifying a deployable project.
///
/// Assigned externally at project creation time and immutable thereafter.
/// The same value appears in object keys (`builds/<id>/...`) and as the
/// leading label of the hostname a request arrives on, so the alphabet is
/// restricted to what a single DNS label can carry. In particular `.` is
/// rejected: a dotted id would publish under a key the hostname parser
/// can never reproduce, since only the first label names the project.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    /// Create from a string, validating that it fits in one hostname label.
    pub fn new(id: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(crate::Error::InvalidProjectId(
                "project id must not be empty".to_string(),
            ));
        }
        for c in id.chars() {
            if !matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_') {
                return Err(crate::Error::InvalidProjectId(format!(
                    "invalid character in project id: {c:?}"
                )));
            }
        }
        Ok(Self(id))
    }

    /// Derive the project id from a request hostname.
    ///
    /// The subdomain is the substring before the first `.`; a hostname with
    /// no dot has no subdomain to derive and yields an error. Any port
    /// suffix must already be stripped by the caller.
    pub fn from_host(host: &str) -> crate::Result<Self> {
        let (label, rest) = host.split_once('.').ok_or_else(|| {
            crate::Error::InvalidProjectId(format!("hostname has no subdomain label: {host}"))
        })?;
        if rest.is_empty() {
            return Err(crate::Error::InvalidProjectId(format!(
                "hostname has no parent domain: {host}"
            )));
        }
        Self::new(label)
    }

    /// Get the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProjectId({self})")
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ProjectId {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::new(value)
    }
}

impl From<ProjectId> for String {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ProjectId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::new(s)
    }
}
