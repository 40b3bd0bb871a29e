#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use confhub_domain::id::UserId;
use confhub_domain::verification::VerificationTarget;

use crate::domain::types::{
    ConsumeOutcome, DirectoryUser, InsertOutcome, TargetDetails, VerificationToken,
};
use crate::error::CheckinServiceError;

/// Store of QR check-in tokens.
pub trait VerificationTokenRepository: Send + Sync {
    /// The target's current active token, if any.
    async fn find_active(
        &self,
        target: &VerificationTarget,
    ) -> Result<Option<VerificationToken>, CheckinServiceError>;

    /// Plain lookup by token string, any status. Does not lock.
    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<VerificationToken>, CheckinServiceError>;

    /// Insert `record` as the target's active token. With `supersede`, the
    /// target's current active token is expired in the same transaction.
    async fn insert_active(
        &self,
        record: &VerificationToken,
        supersede: bool,
    ) -> Result<InsertOutcome, CheckinServiceError>;

    /// Lock the token row, and if it is active mark it used by `verifier`.
    /// Concurrent calls on one token see exactly one `Consumed`.
    async fn consume(
        &self,
        token: &str,
        verifier: UserId,
        at: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, CheckinServiceError>;
}

/// Read-only lookups of the entities tokens point at.
pub trait TargetDirectory: Send + Sync {
    /// Names and codes for `target`; `None` if any part of it does not exist.
    async fn describe(
        &self,
        target: &VerificationTarget,
    ) -> Result<Option<TargetDetails>, CheckinServiceError>;

    async fn find_user(&self, id: UserId) -> Result<Option<DirectoryUser>, CheckinServiceError>;
}
