use chrono::Utc;

use confhub_checkin::domain::types::{MAX_ISSUE_ATTEMPTS, TOKEN_LEN, VerificationToken};
use confhub_checkin::error::CheckinServiceError;
use confhub_checkin::usecase::issue::{IssueTokenInput, IssueTokenUseCase};
use confhub_domain::id::{ActivityId, TeamId};
use confhub_domain::verification::{TokenStatus, VerificationTarget};

use crate::helpers::{FailingTokenRepo, MockDirectory, MockTokenRepo, team_target};

fn usecase(repo: MockTokenRepo) -> IssueTokenUseCase<MockTokenRepo, MockDirectory> {
    IssueTokenUseCase {
        tokens: repo,
        directory: MockDirectory::standard(),
    }
}

fn input(regenerate: bool) -> IssueTokenInput {
    IssueTokenInput {
        target: team_target(),
        regenerate,
    }
}

#[tokio::test]
async fn should_issue_active_token_with_verify_path() {
    let repo = MockTokenRepo::empty();
    let handle = repo.tokens_handle();

    let out = usecase(repo).execute(input(false)).await.unwrap();

    assert!(!out.reused);
    assert_eq!(out.token.status, TokenStatus::Active);
    assert_eq!(out.token.token.len(), TOKEN_LEN);
    assert!(out.token.verified_at.is_none());
    assert!(out.token.verified_by.is_none());
    assert_eq!(
        out.verify_path,
        format!("/verify/HACK24/demo/{}", out.token.token)
    );
    assert_eq!(handle.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_return_same_token_when_issued_twice() {
    let uc = usecase(MockTokenRepo::empty());

    let first = uc.execute(input(false)).await.unwrap();
    let second = uc.execute(input(false)).await.unwrap();

    assert_eq!(first.token.token, second.token.token);
    assert_eq!(first.token.id, second.token.id);
    assert!(second.reused);
}

#[tokio::test]
async fn should_expire_previous_token_on_regenerate() {
    let repo = MockTokenRepo::empty();
    let uc = usecase(repo.clone());

    let first = uc.execute(input(false)).await.unwrap();
    let second = uc.execute(input(true)).await.unwrap();

    assert_ne!(first.token.token, second.token.token);
    assert!(!second.reused);
    assert_eq!(repo.status_of(&first.token.token), Some(TokenStatus::Expired));
    assert_eq!(repo.status_of(&second.token.token), Some(TokenStatus::Active));

    let active = repo
        .tokens_handle()
        .lock()
        .unwrap()
        .iter()
        .filter(|t| t.status == TokenStatus::Active)
        .count();
    assert_eq!(active, 1, "exactly one active token per target");
}

#[tokio::test]
async fn should_issue_on_regenerate_without_prior_token() {
    let out = usecase(MockTokenRepo::empty())
        .execute(input(true))
        .await
        .unwrap();
    assert_eq!(out.token.status, TokenStatus::Active);
}

#[tokio::test]
async fn should_keep_tokens_of_other_targets_active() {
    let repo = MockTokenRepo::empty();
    let mut directory = MockDirectory::standard();
    let other = VerificationTarget::TeamActivity {
        team_id: TeamId(6),
        activity_id: ActivityId(2),
    };
    let details = directory.targets[&team_target().key()].clone();
    directory.targets.insert(other.key(), details);
    let uc = IssueTokenUseCase {
        tokens: repo.clone(),
        directory,
    };

    let mine = uc.execute(input(false)).await.unwrap();
    let theirs = uc
        .execute(IssueTokenInput {
            target: other,
            regenerate: false,
        })
        .await
        .unwrap();
    uc.execute(input(true)).await.unwrap();

    assert_ne!(mine.token.token, theirs.token.token);
    assert_eq!(repo.status_of(&mine.token.token), Some(TokenStatus::Expired));
    assert_eq!(
        repo.status_of(&theirs.token.token),
        Some(TokenStatus::Active)
    );
}

#[tokio::test]
async fn should_retry_generation_on_token_collision() {
    let repo = MockTokenRepo::with_collisions(MAX_ISSUE_ATTEMPTS - 1);
    let out = usecase(repo.clone()).execute(input(false)).await.unwrap();
    assert_eq!(repo.status_of(&out.token.token), Some(TokenStatus::Active));
}

#[tokio::test]
async fn should_hand_out_concurrent_winner_token() {
    let winner = VerificationToken::new_active(team_target(), "W".repeat(TOKEN_LEN), Utc::now());
    let repo = MockTokenRepo::with_race_winner(winner.clone());

    let out = usecase(repo.clone()).execute(input(false)).await.unwrap();

    assert!(out.reused);
    assert_eq!(out.token.id, winner.id);
    assert_eq!(out.token.token, winner.token);
    assert_eq!(
        out.verify_path,
        format!("/verify/HACK24/demo/{}", winner.token)
    );
    assert_eq!(repo.tokens_handle().lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_fail_internally_when_every_attempt_collides() {
    let repo = MockTokenRepo::with_collisions(MAX_ISSUE_ATTEMPTS);
    let result = usecase(repo.clone()).execute(input(false)).await;

    assert!(
        matches!(result, Err(CheckinServiceError::Internal(_))),
        "expected Internal, got {result:?}"
    );
    assert!(repo.tokens_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_return_target_not_found_for_unknown_target() {
    let result = usecase(MockTokenRepo::empty())
        .execute(IssueTokenInput {
            target: VerificationTarget::TeamActivity {
                team_id: TeamId(404),
                activity_id: ActivityId(2),
            },
            regenerate: false,
        })
        .await;

    assert!(
        matches!(result, Err(CheckinServiceError::TargetNotFound)),
        "expected TargetNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_propagate_persistence_failures() {
    let uc = IssueTokenUseCase {
        tokens: FailingTokenRepo,
        directory: MockDirectory::standard(),
    };
    let result = uc.execute(input(false)).await;
    assert!(
        matches!(result, Err(CheckinServiceError::Internal(_))),
        "expected Internal, got {result:?}"
    );
}
