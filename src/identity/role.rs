use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Closed set of account roles. Stored and serialized in lowercase; parsing is
/// case-insensitive. Anything outside this set is rejected at the boundary so
/// free-form role strings never reach storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Alumni,
    Admin,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Alumni => "alumni",
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }

    pub const ALL: [Role; 3] = [Role::Alumni, Role::Admin, Role::Student];
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alumni" => Ok(Role::Alumni),
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            _ => Err(()),
        }
    }
}
