//! Newtype wrappers for domain identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! int_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

int_id!(
    /// Identifies a user account (participant, judge or admin).
    UserId
);

int_id!(
    /// Identifies a conference or hackathon event.
    EventId
);

int_id!(
    /// Identifies a sub-event (workshop, track) inside an event.
    SubEventId
);

int_id!(
    /// Identifies a scheduled activity of an event (e.g. a judging round).
    ActivityId
);

int_id!(
    /// Identifies a participant team.
    TeamId
);

/// Identifies a stored verification token record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationTokenId(pub Uuid);

impl fmt::Display for VerificationTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for VerificationTokenId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}
