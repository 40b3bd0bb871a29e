use anyhow::anyhow;
use chrono::Utc;
use rand::RngExt;

use confhub_domain::verification::VerificationTarget;

use crate::domain::repository::{TargetDirectory, VerificationTokenRepository};
use crate::domain::types::{
    InsertOutcome, MAX_ISSUE_ATTEMPTS, TOKEN_LEN, TargetDetails, VerificationToken,
};
use crate::error::CheckinServiceError;

/// Charset for verification tokens (alphanumeric, ~5.95 bits per symbol).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

pub struct IssueTokenInput {
    pub target: VerificationTarget,
    /// Expire the current active token (if any) and issue a fresh one.
    pub regenerate: bool,
}

#[derive(Debug)]
pub struct IssueTokenOutput {
    pub token: VerificationToken,
    pub details: TargetDetails,
    pub verify_path: String,
    /// `true` when an already active token was returned unchanged.
    pub reused: bool,
}

pub struct IssueTokenUseCase<T, D>
where
    T: VerificationTokenRepository,
    D: TargetDirectory,
{
    pub tokens: T,
    pub directory: D,
}

impl<T, D> IssueTokenUseCase<T, D>
where
    T: VerificationTokenRepository,
    D: TargetDirectory,
{
    pub async fn execute(
        &self,
        input: IssueTokenInput,
    ) -> Result<IssueTokenOutput, CheckinServiceError> {
        let target = input.target;
        let details = self
            .directory
            .describe(&target)
            .await?
            .ok_or(CheckinServiceError::TargetNotFound)?;

        if !input.regenerate {
            if let Some(existing) = self.tokens.find_active(&target).await? {
                return Ok(output(existing, details, true));
            }
        }

        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            let record = VerificationToken::new_active(target, generate_token(), Utc::now());
            match self.tokens.insert_active(&record, input.regenerate).await? {
                InsertOutcome::Inserted => {
                    tracing::info!(
                        target_kind = target.kind().as_str(),
                        target_key = %target,
                        token_id = %record.id,
                        regenerated = input.regenerate,
                        "verification token issued"
                    );
                    return Ok(output(record, details, false));
                }
                InsertOutcome::TokenTaken => {
                    tracing::warn!(attempt, "verification token collision, regenerating");
                }
                InsertOutcome::TargetTaken => {
                    // A concurrent issuer won; hand out its token.
                    if let Some(existing) = self.tokens.find_active(&target).await? {
                        return Ok(output(existing, details, true));
                    }
                }
            }
        }

        Err(anyhow!(
            "no unique verification token for {target} after {MAX_ISSUE_ATTEMPTS} attempts"
        )
        .into())
    }
}

fn output(token: VerificationToken, details: TargetDetails, reused: bool) -> IssueTokenOutput {
    let verify_path = details.verify_path(&token.token);
    IssueTokenOutput {
        token,
        details,
        verify_path,
        reused,
    }
}
