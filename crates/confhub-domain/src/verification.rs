//! Check-in verification targets and token lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{ActivityId, EventId, SubEventId, TeamId, UserId};

/// What a verification token proves attendance for.
///
/// Team-activity tokens and event-registration tokens share one lifecycle,
/// so both are variants of a single target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationTarget {
    /// A team's participation in one activity.
    TeamActivity {
        team_id: TeamId,
        activity_id: ActivityId,
    },
    /// A user's registration for an event, optionally narrowed to a sub-event.
    Registration {
        user_id: UserId,
        event_id: EventId,
        sub_event_id: Option<SubEventId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    TeamActivity,
    Registration,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TeamActivity => "team_activity",
            Self::Registration => "registration",
        }
    }
}

impl VerificationTarget {
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::TeamActivity { .. } => TargetKind::TeamActivity,
            Self::Registration { .. } => TargetKind::Registration,
        }
    }

    /// Canonical key; two targets are the same iff their keys are equal.
    pub fn key(&self) -> String {
        match self {
            Self::TeamActivity {
                team_id,
                activity_id,
            } => format!("team:{team_id}/activity:{activity_id}"),
            Self::Registration {
                user_id,
                event_id,
                sub_event_id: None,
            } => format!("user:{user_id}/event:{event_id}"),
            Self::Registration {
                user_id,
                event_id,
                sub_event_id: Some(sub_event_id),
            } => format!("user:{user_id}/event:{event_id}/sub_event:{sub_event_id}"),
        }
    }
}

impl fmt::Display for VerificationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Lifecycle state of a verification token.
///
/// `Active` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    Active,
    Used,
    Expired,
}

impl TokenStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Used => "used",
            Self::Expired => "expired",
        }
    }

    pub fn can_transition_to(self, next: TokenStatus) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Used) | (Self::Active, Self::Expired)
        )
    }
}
