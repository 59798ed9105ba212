//! Account role domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role tag stored in the role table, exactly one per account.
///
/// Wire format: snake_case string (`"student"`, `"parent"`, `"teacher"`, `"school_admin"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Parent,
    Teacher,
    SchoolAdmin,
}

/// Returned when a role tag is not one of the four known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Student,
        Role::Parent,
        Role::Teacher,
        Role::SchoolAdmin,
    ];

    /// Wire/storage value of the role tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Parent => "parent",
            Self::Teacher => "teacher",
            Self::SchoolAdmin => "school_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_owned()))
    }
}
