use chrono::Utc;

use confhub_domain::id::UserId;
use confhub_domain::user::UserRole;

use crate::domain::repository::{TargetDirectory, VerificationTokenRepository};
use crate::domain::types::{
    CheckinDetails, ConsumeOutcome, TargetDetails, VerificationScope, VerificationToken,
};
use crate::error::CheckinServiceError;

/// Staff member performing a scan.
#[derive(Debug, Clone, Copy)]
pub struct Verifier {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Verifier {
    fn ensure_staff(&self) -> Result<(), CheckinServiceError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(CheckinServiceError::Forbidden)
        }
    }
}

pub struct VerifyTokenInput {
    pub token: String,
    pub scope: VerificationScope,
    pub verifier: Verifier,
}

// ── VerifyToken ──────────────────────────────────────────────────────────────

pub struct VerifyTokenUseCase<T, D>
where
    T: VerificationTokenRepository,
    D: TargetDirectory,
{
    pub tokens: T,
    pub directory: D,
}

impl<T, D> VerifyTokenUseCase<T, D>
where
    T: VerificationTokenRepository,
    D: TargetDirectory,
{
    /// Check the token in and return what was checked in.
    ///
    /// Used and superseded tokens fail with their details attached so staff
    /// can see who was already admitted.
    pub async fn execute(
        &self,
        input: VerifyTokenInput,
    ) -> Result<CheckinDetails, CheckinServiceError> {
        input.verifier.ensure_staff()?;

        // The target of a token never changes, so scoping can happen before the lock.
        let (_, details) =
            find_scoped(&self.tokens, &self.directory, &input.token, &input.scope).await?;

        let outcome = self
            .tokens
            .consume(&input.token, input.verifier.user_id, Utc::now())
            .await?;

        match outcome {
            ConsumeOutcome::NotFound => Err(CheckinServiceError::InvalidToken),
            ConsumeOutcome::Consumed(token) => {
                tracing::info!(
                    token_id = %token.id,
                    target_key = %token.target,
                    verified_by = %input.verifier.user_id,
                    "check-in verified"
                );
                checkin_details(&self.directory, token, details).await
            }
            ConsumeOutcome::AlreadyUsed(token) => {
                tracing::info!(
                    token_id = %token.id,
                    status = token.status.as_str(),
                    "rejected scan of used token"
                );
                let details = checkin_details(&self.directory, token, details).await?;
                Err(CheckinServiceError::AlreadyConsumed(Box::new(details)))
            }
            ConsumeOutcome::Expired(token) => {
                tracing::info!(
                    token_id = %token.id,
                    status = token.status.as_str(),
                    "rejected scan of expired token"
                );
                let details = checkin_details(&self.directory, token, details).await?;
                Err(CheckinServiceError::Expired(Box::new(details)))
            }
        }
    }
}

// ── InspectToken ─────────────────────────────────────────────────────────────

pub struct InspectTokenInput {
    pub token: String,
    pub scope: VerificationScope,
    pub verifier: Verifier,
}

/// Scan preview: token state and target without consuming anything.
pub struct InspectTokenUseCase<T, D>
where
    T: VerificationTokenRepository,
    D: TargetDirectory,
{
    pub tokens: T,
    pub directory: D,
}

impl<T, D> InspectTokenUseCase<T, D>
where
    T: VerificationTokenRepository,
    D: TargetDirectory,
{
    pub async fn execute(
        &self,
        input: InspectTokenInput,
    ) -> Result<CheckinDetails, CheckinServiceError> {
        input.verifier.ensure_staff()?;
        let (token, details) =
            find_scoped(&self.tokens, &self.directory, &input.token, &input.scope).await?;
        checkin_details(&self.directory, token, details).await
    }
}

// ── helpers ──────────────────────────────────────────────────────────────────

/// Look the token up and make sure it belongs to the scanned URL.
/// Unknown, dangling and out-of-scope tokens are all `InvalidToken`.
async fn find_scoped<T, D>(
    tokens: &T,
    directory: &D,
    token: &str,
    scope: &VerificationScope,
) -> Result<(VerificationToken, TargetDetails), CheckinServiceError>
where
    T: VerificationTokenRepository,
    D: TargetDirectory,
{
    let record = tokens
        .find_by_token(token)
        .await?
        .ok_or(CheckinServiceError::InvalidToken)?;

    let Some(details) = directory.describe(&record.target).await? else {
        tracing::warn!(
            token_id = %record.id,
            target_key = %record.target,
            "token target no longer exists"
        );
        return Err(CheckinServiceError::InvalidToken);
    };

    if !scope.matches(&details) {
        return Err(CheckinServiceError::InvalidToken);
    }
    Ok((record, details))
}

async fn checkin_details<D: TargetDirectory>(
    directory: &D,
    token: VerificationToken,
    target: TargetDetails,
) -> Result<CheckinDetails, CheckinServiceError> {
    let verified_by = match token.verified_by {
        Some(id) => directory.find_user(id).await?,
        None => None,
    };
    Ok(CheckinDetails {
        status: token.status,
        target,
        issued_at: token.created_at,
        verified_at: token.verified_at,
        verified_by,
    })
}
