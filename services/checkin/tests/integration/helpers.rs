use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use chrono::{DateTime, Utc};

use confhub_checkin::domain::repository::{TargetDirectory, VerificationTokenRepository};
use confhub_checkin::domain::types::{
    ConsumeOutcome, DirectoryUser, InsertOutcome, TargetDetails, VerificationScope,
    VerificationToken,
};
use confhub_checkin::error::CheckinServiceError;
use confhub_checkin::usecase::verify::Verifier;
use confhub_domain::id::{ActivityId, EventId, SubEventId, TeamId, UserId};
use confhub_domain::user::UserRole;
use confhub_domain::verification::{TokenStatus, VerificationTarget};

// ── MockTokenRepo ────────────────────────────────────────────────────────────

/// In-memory token store. The mutex plays the role of the row lock, and the
/// active-target check mirrors the partial unique index.
#[derive(Clone, Default)]
pub struct MockTokenRepo {
    pub tokens: Arc<Mutex<Vec<VerificationToken>>>,
    /// Number of upcoming inserts to reject as token collisions.
    pub forced_collisions: Arc<Mutex<usize>>,
    /// Token a concurrent issuer stores just before the next insert lands.
    pub race_winner: Arc<Mutex<Option<VerificationToken>>>,
}

impl MockTokenRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_collisions(count: usize) -> Self {
        let repo = Self::default();
        *repo.forced_collisions.lock().unwrap() = count;
        repo
    }

    /// The next insert loses to `winner`, which becomes the active token.
    pub fn with_race_winner(winner: VerificationToken) -> Self {
        let repo = Self::default();
        *repo.race_winner.lock().unwrap() = Some(winner);
        repo
    }

    /// Shared handle to the stored tokens for post-execution inspection.
    pub fn tokens_handle(&self) -> Arc<Mutex<Vec<VerificationToken>>> {
        Arc::clone(&self.tokens)
    }

    pub fn status_of(&self, token: &str) -> Option<TokenStatus> {
        self.tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token == token)
            .map(|t| t.status)
    }
}

impl VerificationTokenRepository for MockTokenRepo {
    async fn find_active(
        &self,
        target: &VerificationTarget,
    ) -> Result<Option<VerificationToken>, CheckinServiceError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.target == *target && t.is_active())
            .cloned())
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<VerificationToken>, CheckinServiceError> {
        tokio::task::yield_now().await;
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token == token)
            .cloned())
    }

    async fn insert_active(
        &self,
        record: &VerificationToken,
        supersede: bool,
    ) -> Result<InsertOutcome, CheckinServiceError> {
        {
            let mut remaining = self.forced_collisions.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(InsertOutcome::TokenTaken);
            }
        }

        let mut tokens = self.tokens.lock().unwrap();
        if let Some(winner) = self.race_winner.lock().unwrap().take() {
            tokens.push(winner);
        }
        if tokens.iter().any(|t| t.token == record.token) {
            return Ok(InsertOutcome::TokenTaken);
        }
        if supersede {
            for t in tokens.iter_mut().filter(|t| t.target == record.target) {
                t.mark_expired();
            }
        }
        if tokens
            .iter()
            .any(|t| t.target == record.target && t.is_active())
        {
            return Ok(InsertOutcome::TargetTaken);
        }
        tokens.push(record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn consume(
        &self,
        token: &str,
        verifier: UserId,
        at: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, CheckinServiceError> {
        tokio::task::yield_now().await;
        let mut tokens = self.tokens.lock().unwrap();
        let Some(record) = tokens.iter_mut().find(|t| t.token == token) else {
            return Ok(ConsumeOutcome::NotFound);
        };
        if record.mark_used(verifier, at) {
            return Ok(ConsumeOutcome::Consumed(record.clone()));
        }
        Ok(match record.status {
            TokenStatus::Expired => ConsumeOutcome::Expired(record.clone()),
            _ => ConsumeOutcome::AlreadyUsed(record.clone()),
        })
    }
}

// ── FailingTokenRepo ─────────────────────────────────────────────────────────

/// Every call fails as if the database connection dropped.
pub struct FailingTokenRepo;

fn connection_lost() -> CheckinServiceError {
    CheckinServiceError::Internal(anyhow!("connection reset by peer"))
}

impl VerificationTokenRepository for FailingTokenRepo {
    async fn find_active(
        &self,
        _target: &VerificationTarget,
    ) -> Result<Option<VerificationToken>, CheckinServiceError> {
        Err(connection_lost())
    }

    async fn find_by_token(
        &self,
        _token: &str,
    ) -> Result<Option<VerificationToken>, CheckinServiceError> {
        Err(connection_lost())
    }

    async fn insert_active(
        &self,
        _record: &VerificationToken,
        _supersede: bool,
    ) -> Result<InsertOutcome, CheckinServiceError> {
        Err(connection_lost())
    }

    async fn consume(
        &self,
        _token: &str,
        _verifier: UserId,
        _at: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, CheckinServiceError> {
        Err(connection_lost())
    }
}

// ── MockDirectory ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockDirectory {
    pub targets: HashMap<String, TargetDetails>,
    pub users: Vec<DirectoryUser>,
}

impl MockDirectory {
    /// Directory knowing team 5 / activity 2, participant 9's registrations
    /// for event 1 and sub-event 3, and the staff member. Any other
    /// registration target counts as unregistered.
    pub fn standard() -> Self {
        let mut targets = HashMap::new();
        targets.insert(team_target().key(), team_details());
        targets.insert(
            registration_target(None).key(),
            registration_details(None),
        );
        targets.insert(
            registration_target(Some(SUB_EVENT_ID)).key(),
            registration_details(Some(SUB_EVENT_ID)),
        );
        Self {
            targets,
            users: vec![staff_user()],
        }
    }
}

impl TargetDirectory for MockDirectory {
    async fn describe(
        &self,
        target: &VerificationTarget,
    ) -> Result<Option<TargetDetails>, CheckinServiceError> {
        Ok(self.targets.get(&target.key()).cloned())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<DirectoryUser>, CheckinServiceError> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub const EVENT_CODE: &str = "HACK24";
pub const ACTIVITY_CODE: &str = "demo";

pub fn team_target() -> VerificationTarget {
    VerificationTarget::TeamActivity {
        team_id: TeamId(5),
        activity_id: ActivityId(2),
    }
}

pub fn team_details() -> TargetDetails {
    TargetDetails::TeamActivity {
        event_id: EventId(1),
        event_code: EVENT_CODE.to_owned(),
        event_name: "Hack 2024".to_owned(),
        team_id: TeamId(5),
        team_name: "Rustaceans".to_owned(),
        activity_id: ActivityId(2),
        activity_code: ACTIVITY_CODE.to_owned(),
        activity_name: "Demo day".to_owned(),
    }
}

pub fn team_scope() -> VerificationScope {
    VerificationScope::Activity {
        event_code: EVENT_CODE.to_owned(),
        activity_code: ACTIVITY_CODE.to_owned(),
    }
}

pub const PARTICIPANT_ID: UserId = UserId(9);
pub const SUB_EVENT_ID: SubEventId = SubEventId(3);

pub fn registration_target(sub_event_id: Option<SubEventId>) -> VerificationTarget {
    VerificationTarget::Registration {
        user_id: PARTICIPANT_ID,
        event_id: EventId(1),
        sub_event_id,
    }
}

pub fn registration_details(sub_event_id: Option<SubEventId>) -> TargetDetails {
    TargetDetails::Registration {
        event_id: EventId(1),
        event_code: EVENT_CODE.to_owned(),
        event_name: "Hack 2024".to_owned(),
        user_id: PARTICIPANT_ID,
        participant_name: "Ada Lovelace".to_owned(),
        sub_event_id,
        sub_event_name: sub_event_id.map(|_| "Workshop track".to_owned()),
    }
}

pub fn registration_scope() -> VerificationScope {
    VerificationScope::Registration {
        event_code: EVENT_CODE.to_owned(),
        user_id: PARTICIPANT_ID,
    }
}

pub fn staff_user() -> DirectoryUser {
    DirectoryUser {
        id: UserId(100),
        name: "Grace Hopper".to_owned(),
    }
}

pub fn staff() -> Verifier {
    Verifier {
        user_id: staff_user().id,
        role: UserRole::Judge,
    }
}

pub fn participant() -> Verifier {
    Verifier {
        user_id: PARTICIPANT_ID,
        role: UserRole::Participant,
    }
}
