//! User domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role. Decides the landing dashboard and who may check people in.
///
/// Wire format: lowercase string (`admin`, `judge`, `participant`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Judge,
    Participant,
}

/// Role → landing route. The single source of truth for post-login redirects.
const LANDING_ROUTES: [(UserRole, &str); 3] = [
    (UserRole::Admin, "/admin/dashboard"),
    (UserRole::Judge, "/judge/dashboard"),
    (UserRole::Participant, "/participant/dashboard"),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Judge => "judge",
            Self::Participant => "participant",
        }
    }

    /// Route the user lands on after authenticating.
    pub fn landing_route(self) -> &'static str {
        LANDING_ROUTES
            .iter()
            .find(|(role, _)| *role == self)
            .map(|(_, route)| *route)
            .unwrap_or("/")
    }

    /// Staff roles may scan and consume check-in tokens.
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Judge)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "judge" => Ok(Self::Judge),
            "participant" => Ok(Self::Participant),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}
