use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use confhub_domain::id::{
    ActivityId, EventId, SubEventId, TeamId, UserId, VerificationTokenId,
};
use confhub_domain::verification::{TokenStatus, VerificationTarget};

/// Length of generated verification tokens.
pub const TOKEN_LEN: usize = 40;

/// Attempts at generating a token that does not collide with an existing one.
pub const MAX_ISSUE_ATTEMPTS: usize = 5;

/// Persisted QR check-in token.
#[derive(Debug, Clone)]
pub struct VerificationToken {
    pub id: VerificationTokenId,
    pub target: VerificationTarget,
    pub token: String,
    pub status: TokenStatus,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<UserId>,
}

impl VerificationToken {
    pub fn new_active(target: VerificationTarget, token: String, now: DateTime<Utc>) -> Self {
        Self {
            id: VerificationTokenId(Uuid::now_v7()),
            target,
            token,
            status: TokenStatus::Active,
            created_at: now,
            verified_at: None,
            verified_by: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TokenStatus::Active
    }

    /// `active → used`, stamping the verifier. Returns `false` (and changes
    /// nothing) if the token is not active.
    pub fn mark_used(&mut self, verifier: UserId, at: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(TokenStatus::Used) {
            return false;
        }
        self.status = TokenStatus::Used;
        self.verified_at = Some(at);
        self.verified_by = Some(verifier);
        true
    }

    /// `active → expired`. Returns `false` if the token is not active.
    pub fn mark_expired(&mut self) -> bool {
        if !self.status.can_transition_to(TokenStatus::Expired) {
            return false;
        }
        self.status = TokenStatus::Expired;
        true
    }
}

/// Result of inserting a freshly generated active token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The token string already exists; generate another one.
    TokenTaken,
    /// Another active token for the same target won a concurrent insert.
    TargetTaken,
}

/// Result of the atomic check-and-consume step.
#[derive(Debug, Clone)]
pub enum ConsumeOutcome {
    NotFound,
    Consumed(VerificationToken),
    AlreadyUsed(VerificationToken),
    Expired(VerificationToken),
}

/// Human-readable description of a verification target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetDetails {
    TeamActivity {
        event_id: EventId,
        event_code: String,
        event_name: String,
        team_id: TeamId,
        team_name: String,
        activity_id: ActivityId,
        activity_code: String,
        activity_name: String,
    },
    Registration {
        event_id: EventId,
        event_code: String,
        event_name: String,
        user_id: UserId,
        participant_name: String,
        sub_event_id: Option<SubEventId>,
        sub_event_name: Option<String>,
    },
}

impl TargetDetails {
    /// Path encoded in the QR code for `token`.
    pub fn verify_path(&self, token: &str) -> String {
        match self {
            Self::TeamActivity {
                event_code,
                activity_code,
                ..
            } => format!("/verify/{event_code}/{activity_code}/{token}"),
            Self::Registration {
                event_code,
                user_id,
                ..
            } => format!("/verify-registration/{event_code}/{user_id}/{token}"),
        }
    }
}

/// Where a scanned token claims to belong, taken from the verification URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationScope {
    Activity {
        event_code: String,
        activity_code: String,
    },
    Registration {
        event_code: String,
        user_id: UserId,
    },
}

impl VerificationScope {
    pub fn matches(&self, details: &TargetDetails) -> bool {
        match (self, details) {
            (
                Self::Activity {
                    event_code,
                    activity_code,
                },
                TargetDetails::TeamActivity {
                    event_code: target_event,
                    activity_code: target_activity,
                    ..
                },
            ) => event_code == target_event && activity_code == target_activity,
            (
                Self::Registration {
                    event_code,
                    user_id,
                },
                TargetDetails::Registration {
                    event_code: target_event,
                    user_id: target_user,
                    ..
                },
            ) => event_code == target_event && user_id == target_user,
            _ => false,
        }
    }
}

/// Account data the directory exposes for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryUser {
    pub id: UserId,
    pub name: String,
}

/// Everything a scan result page shows about a token.
#[derive(Debug, Clone, Serialize)]
pub struct CheckinDetails {
    pub status: TokenStatus,
    pub target: TargetDetails,
    #[serde(serialize_with = "confhub_core::serde::to_rfc3339_ms")]
    pub issued_at: DateTime<Utc>,
    #[serde(serialize_with = "confhub_core::serde::to_rfc3339_ms_opt")]
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<DirectoryUser>,
}
