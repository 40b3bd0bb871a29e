use axum::{
    Json,
    extract::{Path, State},
};

use confhub_auth_types::identity::IdentityHeaders;
use confhub_domain::id::UserId;

use crate::domain::types::{CheckinDetails, VerificationScope};
use crate::error::CheckinServiceError;
use crate::state::AppState;
use crate::usecase::verify::{
    InspectTokenInput, InspectTokenUseCase, Verifier, VerifyTokenInput, VerifyTokenUseCase,
};

fn verifier(identity: IdentityHeaders) -> Verifier {
    Verifier {
        user_id: identity.user_id,
        role: identity.user_role,
    }
}

async fn inspect(
    state: &AppState,
    identity: IdentityHeaders,
    token: String,
    scope: VerificationScope,
) -> Result<Json<CheckinDetails>, CheckinServiceError> {
    let usecase = InspectTokenUseCase {
        tokens: state.token_repo(),
        directory: state.directory(),
    };
    let details = usecase
        .execute(InspectTokenInput {
            token,
            scope,
            verifier: verifier(identity),
        })
        .await?;
    Ok(Json(details))
}

async fn verify(
    state: &AppState,
    identity: IdentityHeaders,
    token: String,
    scope: VerificationScope,
) -> Result<Json<CheckinDetails>, CheckinServiceError> {
    let usecase = VerifyTokenUseCase {
        tokens: state.token_repo(),
        directory: state.directory(),
    };
    let details = usecase
        .execute(VerifyTokenInput {
            token,
            scope,
            verifier: verifier(identity),
        })
        .await?;
    Ok(Json(details))
}

// ── /verify/{event_code}/{activity_code}/{token} ─────────────────────────────

pub async fn inspect_team_token(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((event_code, activity_code, token)): Path<(String, String, String)>,
) -> Result<Json<CheckinDetails>, CheckinServiceError> {
    let scope = VerificationScope::Activity {
        event_code,
        activity_code,
    };
    inspect(&state, identity, token, scope).await
}

pub async fn verify_team_token(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((event_code, activity_code, token)): Path<(String, String, String)>,
) -> Result<Json<CheckinDetails>, CheckinServiceError> {
    let scope = VerificationScope::Activity {
        event_code,
        activity_code,
    };
    verify(&state, identity, token, scope).await
}

// ── /verify-registration/{event_code}/{user_id}/{token} ──────────────────────

pub async fn inspect_registration_token(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((event_code, user_id, token)): Path<(String, i64, String)>,
) -> Result<Json<CheckinDetails>, CheckinServiceError> {
    let scope = VerificationScope::Registration {
        event_code,
        user_id: UserId(user_id),
    };
    inspect(&state, identity, token, scope).await
}

pub async fn verify_registration_token(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((event_code, user_id, token)): Path<(String, i64, String)>,
) -> Result<Json<CheckinDetails>, CheckinServiceError> {
    let scope = VerificationScope::Registration {
        event_code,
        user_id: UserId(user_id),
    };
    verify(&state, identity, token, scope).await
}
