use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use confhub_auth_types::identity::IdentityHeaders;
use confhub_domain::id::{ActivityId, EventId, SubEventId, TeamId};
use confhub_domain::verification::{TokenStatus, VerificationTarget};

use crate::domain::types::TargetDetails;
use crate::error::CheckinServiceError;
use crate::state::AppState;
use crate::usecase::issue::{IssueTokenInput, IssueTokenOutput, IssueTokenUseCase};

#[derive(Serialize)]
pub struct IssueTokenResponse {
    pub token: String,
    pub status: TokenStatus,
    pub verify_path: String,
    pub target: TargetDetails,
    #[serde(serialize_with = "confhub_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

async fn issue(
    state: &AppState,
    input: IssueTokenInput,
) -> Result<(StatusCode, Json<IssueTokenResponse>), CheckinServiceError> {
    let usecase = IssueTokenUseCase {
        tokens: state.token_repo(),
        directory: state.directory(),
    };
    let IssueTokenOutput {
        token,
        details,
        verify_path,
        reused,
    } = usecase.execute(input).await?;

    let status = if reused {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let body = IssueTokenResponse {
        token: token.token,
        status: token.status,
        verify_path,
        target: details,
        created_at: token.created_at,
    };
    Ok((status, Json(body)))
}

// ── POST /teams/{team_id}/activities/{activity_id}/token ─────────────────────

#[derive(Deserialize, Default)]
pub struct IssueTeamTokenRequest {
    #[serde(default)]
    pub regenerate: bool,
}

pub async fn issue_team_token(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((team_id, activity_id)): Path<(i64, i64)>,
    body: Option<Json<IssueTeamTokenRequest>>,
) -> Result<(StatusCode, Json<IssueTokenResponse>), CheckinServiceError> {
    let Json(body) = body.unwrap_or_default();
    let target = VerificationTarget::TeamActivity {
        team_id: TeamId(team_id),
        activity_id: ActivityId(activity_id),
    };
    issue(
        &state,
        IssueTokenInput {
            target,
            regenerate: body.regenerate,
        },
    )
    .await
}

// ── POST /events/{event_id}/registration/token ───────────────────────────────

#[derive(Deserialize, Default)]
pub struct IssueRegistrationTokenRequest {
    pub sub_event_id: Option<i64>,
    #[serde(default)]
    pub regenerate: bool,
}

/// Issues the caller's own registration token.
pub async fn issue_registration_token(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    body: Option<Json<IssueRegistrationTokenRequest>>,
) -> Result<(StatusCode, Json<IssueTokenResponse>), CheckinServiceError> {
    let Json(body) = body.unwrap_or_default();
    let target = VerificationTarget::Registration {
        user_id: identity.user_id,
        event_id: EventId(event_id),
        sub_event_id: body.sub_event_id.map(SubEventId),
    };
    issue(
        &state,
        IssueTokenInput {
            target,
            regenerate: body.regenerate,
        },
    )
    .await
}
