use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, Iterable, QueryFilter, QuerySelect, SqlErr, TransactionError,
    TransactionTrait, sea_query::Expr,
};

use confhub_checkin_schema::verification_tokens::{
    self, ACTIVE_TARGET_UNIQUE_INDEX, TargetKind as DbTargetKind, TokenStatus as DbTokenStatus,
};
use confhub_checkin_schema::{activities, event_registrations, events, sub_events, teams, users};
use confhub_domain::id::{
    ActivityId, EventId, SubEventId, TeamId, UserId, VerificationTokenId,
};
use confhub_domain::verification::{TargetKind, TokenStatus, VerificationTarget};

use crate::domain::repository::{TargetDirectory, VerificationTokenRepository};
use crate::domain::types::{
    ConsumeOutcome, DirectoryUser, InsertOutcome, TargetDetails, VerificationToken,
};
use crate::error::CheckinServiceError;

// ── VerificationToken repository ─────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationTokenRepository {
    pub db: DatabaseConnection,
}

/// What the locked read inside `consume` saw.
enum Locked {
    Missing,
    Consumed(VerificationToken),
    Unchanged(VerificationToken),
}

impl VerificationTokenRepository for DbVerificationTokenRepository {
    async fn find_active(
        &self,
        target: &VerificationTarget,
    ) -> Result<Option<VerificationToken>, CheckinServiceError> {
        let model = verification_tokens::Entity::find()
            .filter(verification_tokens::Column::TargetKey.eq(target.key()))
            .filter(verification_tokens::Column::Status.eq(DbTokenStatus::Active))
            .one(&self.db)
            .await
            .context("find active verification token")?;
        Ok(model.map(token_from_model).transpose()?)
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<VerificationToken>, CheckinServiceError> {
        let model = verification_tokens::Entity::find()
            .filter(verification_tokens::Column::Token.eq(token))
            .one(&self.db)
            .await
            .context("find verification token")?;
        Ok(model.map(token_from_model).transpose()?)
    }

    async fn insert_active(
        &self,
        record: &VerificationToken,
        supersede: bool,
    ) -> Result<InsertOutcome, CheckinServiceError> {
        let result = self
            .db
            .transaction::<_, (), DbErr>(|txn| {
                let record = record.clone();
                Box::pin(async move {
                    if supersede {
                        expire_active(txn, &record.target).await?;
                    }
                    insert_token(txn, &record).await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => Ok(InsertOutcome::Inserted),
            Err(TransactionError::Transaction(err)) => match classify_unique_violation(&err) {
                Some(outcome) => Ok(outcome),
                None => Err(anyhow::Error::new(err)
                    .context("insert verification token")
                    .into()),
            },
            Err(err) => Err(anyhow::Error::new(err)
                .context("insert verification token")
                .into()),
        }
    }

    async fn consume(
        &self,
        token: &str,
        verifier: UserId,
        at: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, CheckinServiceError> {
        let token = token.to_owned();
        let locked = self
            .db
            .transaction::<_, Locked, DbErr>(|txn| {
                Box::pin(async move {
                    let Some(model) = verification_tokens::Entity::find()
                        .filter(verification_tokens::Column::Token.eq(token.as_str()))
                        .lock_exclusive()
                        .one(txn)
                        .await?
                    else {
                        return Ok(Locked::Missing);
                    };

                    let mut record =
                        token_from_model(model).map_err(|e| DbErr::Custom(format!("{e:#}")))?;
                    if !record.mark_used(verifier, at) {
                        return Ok(Locked::Unchanged(record));
                    }

                    verification_tokens::ActiveModel {
                        id: Set(record.id.0),
                        status: Set(status_to_model(record.status)),
                        verified_at: Set(record.verified_at),
                        verified_by: Set(record.verified_by.map(|id| id.0)),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    Ok(Locked::Consumed(record))
                })
            })
            .await
            .context("consume verification token")?;

        let outcome = match locked {
            Locked::Missing => ConsumeOutcome::NotFound,
            Locked::Consumed(token) => ConsumeOutcome::Consumed(token),
            Locked::Unchanged(token) => match token.status {
                TokenStatus::Used => ConsumeOutcome::AlreadyUsed(token),
                TokenStatus::Expired => ConsumeOutcome::Expired(token),
                TokenStatus::Active => {
                    let id = token.id;
                    return Err(anyhow::anyhow!("token {id} still active after lock").into());
                }
            },
        };
        Ok(outcome)
    }
}

async fn expire_active(
    txn: &DatabaseTransaction,
    target: &VerificationTarget,
) -> Result<(), DbErr> {
    verification_tokens::Entity::update_many()
        .col_expr(verification_tokens::Column::Status, Expr::value(DbTokenStatus::Expired))
        .filter(verification_tokens::Column::TargetKey.eq(target.key()))
        .filter(verification_tokens::Column::Status.is_in(expirable_statuses()))
        .exec(txn)
        .await?;
    Ok(())
}

async fn insert_token(txn: &DatabaseTransaction, record: &VerificationToken) -> Result<(), DbErr> {
    let columns = TargetColumns::from(&record.target);
    verification_tokens::ActiveModel {
        id: Set(record.id.0),
        target_kind: Set(kind_to_model(record.target.kind())),
        target_key: Set(record.target.key()),
        team_id: Set(columns.team_id),
        activity_id: Set(columns.activity_id),
        user_id: Set(columns.user_id),
        event_id: Set(columns.event_id),
        sub_event_id: Set(columns.sub_event_id),
        token: Set(record.token.clone()),
        status: Set(status_to_model(record.status)),
        created_at: Set(record.created_at),
        verified_at: Set(record.verified_at),
        verified_by: Set(record.verified_by.map(|id| id.0)),
    }
    .insert(txn)
    .await?;
    Ok(())
}

/// Stored statuses an active-token supersede may move to `expired`.
fn expirable_statuses() -> Vec<DbTokenStatus> {
    DbTokenStatus::iter()
        .filter(|status| status_from_model(*status).can_transition_to(TokenStatus::Expired))
        .collect()
}

/// Map unique-index violations on insert to a retry decision.
fn classify_unique_violation(err: &DbErr) -> Option<InsertOutcome> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            Some(unique_violation_outcome(&message))
        }
        _ => None,
    }
}

/// Postgres names the violated index in the message. Anything other than
/// the active-target index is the token index.
fn unique_violation_outcome(message: &str) -> InsertOutcome {
    if message.contains(ACTIVE_TARGET_UNIQUE_INDEX) {
        InsertOutcome::TargetTaken
    } else {
        InsertOutcome::TokenTaken
    }
}

/// Typed target columns of a `verification_tokens` row.
struct TargetColumns {
    team_id: Option<i64>,
    activity_id: Option<i64>,
    user_id: Option<i64>,
    event_id: Option<i64>,
    sub_event_id: Option<i64>,
}

impl From<&VerificationTarget> for TargetColumns {
    fn from(target: &VerificationTarget) -> Self {
        match *target {
            VerificationTarget::TeamActivity {
                team_id,
                activity_id,
            } => Self {
                team_id: Some(team_id.0),
                activity_id: Some(activity_id.0),
                user_id: None,
                event_id: None,
                sub_event_id: None,
            },
            VerificationTarget::Registration {
                user_id,
                event_id,
                sub_event_id,
            } => Self {
                team_id: None,
                activity_id: None,
                user_id: Some(user_id.0),
                event_id: Some(event_id.0),
                sub_event_id: sub_event_id.map(|id| id.0),
            },
        }
    }
}

fn target_from_model(model: &verification_tokens::Model) -> anyhow::Result<VerificationTarget> {
    let target = match model.target_kind {
        DbTargetKind::TeamActivity => VerificationTarget::TeamActivity {
            team_id: TeamId(model.team_id.context("team_activity token without team_id")?),
            activity_id: ActivityId(
                model
                    .activity_id
                    .context("team_activity token without activity_id")?,
            ),
        },
        DbTargetKind::Registration => VerificationTarget::Registration {
            user_id: UserId(model.user_id.context("registration token without user_id")?),
            event_id: EventId(model.event_id.context("registration token without event_id")?),
            sub_event_id: model.sub_event_id.map(SubEventId),
        },
    };
    Ok(target)
}

fn kind_to_model(kind: TargetKind) -> DbTargetKind {
    match kind {
        TargetKind::TeamActivity => DbTargetKind::TeamActivity,
        TargetKind::Registration => DbTargetKind::Registration,
    }
}

fn status_from_model(status: DbTokenStatus) -> TokenStatus {
    match status {
        DbTokenStatus::Active => TokenStatus::Active,
        DbTokenStatus::Used => TokenStatus::Used,
        DbTokenStatus::Expired => TokenStatus::Expired,
    }
}

fn status_to_model(status: TokenStatus) -> DbTokenStatus {
    match status {
        TokenStatus::Active => DbTokenStatus::Active,
        TokenStatus::Used => DbTokenStatus::Used,
        TokenStatus::Expired => DbTokenStatus::Expired,
    }
}

fn token_from_model(model: verification_tokens::Model) -> anyhow::Result<VerificationToken> {
    let target = target_from_model(&model)
        .with_context(|| format!("malformed verification token {}", model.id))?;
    Ok(VerificationToken {
        id: VerificationTokenId(model.id),
        target,
        token: model.token,
        status: status_from_model(model.status),
        created_at: model.created_at,
        verified_at: model.verified_at,
        verified_by: model.verified_by.map(UserId),
    })
}

// ── Target directory ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTargetDirectory {
    pub db: DatabaseConnection,
}

impl TargetDirectory for DbTargetDirectory {
    async fn describe(
        &self,
        target: &VerificationTarget,
    ) -> Result<Option<TargetDetails>, CheckinServiceError> {
        match *target {
            VerificationTarget::TeamActivity {
                team_id,
                activity_id,
            } => self.describe_team_activity(team_id, activity_id).await,
            VerificationTarget::Registration {
                user_id,
                event_id,
                sub_event_id,
            } => {
                self.describe_registration(user_id, event_id, sub_event_id)
                    .await
            }
        }
    }

    async fn find_user(&self, id: UserId) -> Result<Option<DirectoryUser>, CheckinServiceError> {
        let model = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(|m| DirectoryUser {
            id: UserId(m.id),
            name: m.name,
        }))
    }
}

impl DbTargetDirectory {
    async fn describe_team_activity(
        &self,
        team_id: TeamId,
        activity_id: ActivityId,
    ) -> Result<Option<TargetDetails>, CheckinServiceError> {
        let Some(team) = teams::Entity::find_by_id(team_id.0)
            .one(&self.db)
            .await
            .context("find team by id")?
        else {
            return Ok(None);
        };
        let Some(activity) = activities::Entity::find_by_id(activity_id.0)
            .one(&self.db)
            .await
            .context("find activity by id")?
        else {
            return Ok(None);
        };
        // A team can only check in to activities of its own event.
        if team.event_id != activity.event_id {
            return Ok(None);
        }
        let Some(event) = self.find_event(activity.event_id).await? else {
            return Ok(None);
        };

        Ok(Some(TargetDetails::TeamActivity {
            event_id: EventId(event.id),
            event_code: event.code,
            event_name: event.name,
            team_id,
            team_name: team.name,
            activity_id,
            activity_code: activity.code,
            activity_name: activity.name,
        }))
    }

    async fn describe_registration(
        &self,
        user_id: UserId,
        event_id: EventId,
        sub_event_id: Option<SubEventId>,
    ) -> Result<Option<TargetDetails>, CheckinServiceError> {
        let Some(user) = users::Entity::find_by_id(user_id.0)
            .one(&self.db)
            .await
            .context("find user by id")?
        else {
            return Ok(None);
        };
        let Some(event) = self.find_event(event_id.0).await? else {
            return Ok(None);
        };

        let registrations = event_registrations::Entity::find()
            .filter(event_registrations::Column::UserId.eq(user_id.0))
            .filter(event_registrations::Column::EventId.eq(event_id.0))
            .all(&self.db)
            .await
            .context("find event registrations")?;
        if !registration_covers(&registrations, sub_event_id) {
            return Ok(None);
        }

        let sub_event_name = match sub_event_id {
            Some(id) => {
                let sub_event = sub_events::Entity::find_by_id(id.0)
                    .one(&self.db)
                    .await
                    .context("find sub-event by id")?;
                match sub_event {
                    Some(sub_event) if sub_event.event_id == event.id => Some(sub_event.name),
                    _ => return Ok(None),
                }
            }
            None => None,
        };

        Ok(Some(TargetDetails::Registration {
            event_id,
            event_code: event.code,
            event_name: event.name,
            user_id,
            participant_name: user.name,
            sub_event_id,
            sub_event_name,
        }))
    }

    async fn find_event(&self, id: i64) -> Result<Option<events::Model>, CheckinServiceError> {
        let model = events::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find event by id")?;
        Ok(model)
    }
}

/// Event-wide tokens need any registration for the event; sub-event tokens
/// need a registration for that sub-event.
fn registration_covers(
    registrations: &[event_registrations::Model],
    sub_event_id: Option<SubEventId>,
) -> bool {
    match sub_event_id {
        None => !registrations.is_empty(),
        Some(id) => registrations.iter().any(|r| r.sub_event_id == Some(id.0)),
    }
}
