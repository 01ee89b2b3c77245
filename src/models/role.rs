use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of application roles. All role handling goes through this
/// enum; raw role strings are resolved exactly once, at the session/path
/// boundary, via `Role::parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Dean,
    Department,
    Faculty,
}

impl Role {
    /// Resolve a raw role string (path segment or stored value). Matching
    /// is case-insensitive on input; storage and serialization always use
    /// the lowercase form.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "dean" => Some(Role::Dean),
            "department" => Some(Role::Department),
            "faculty" => Some(Role::Faculty),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Dean => "dean",
            Role::Department => "department",
            Role::Faculty => "faculty",
        }
    }

    /// Reviewer roles may approve/reject proposals and request revisions.
    pub fn is_reviewer(&self) -> bool {
        matches!(self, Role::Admin | Role::Dean | Role::Faculty)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
