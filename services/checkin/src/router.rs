use axum::{
    Router,
    routing::{get, post},
};

use confhub_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    health::{healthz, readyz},
    issue::{issue_registration_token, issue_team_token},
    landing::dashboard,
    verify::{
        inspect_registration_token, inspect_team_token, verify_registration_token,
        verify_team_token,
    },
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Landing
        .route("/dashboard", get(dashboard))
        // Token issuance
        .route(
            "/teams/{team_id}/activities/{activity_id}/token",
            post(issue_team_token),
        )
        .route(
            "/events/{event_id}/registration/token",
            post(issue_registration_token),
        )
        // Verification
        .route(
            "/verify/{event_code}/{activity_code}/{token}",
            get(inspect_team_token).post(verify_team_token),
        )
        .route(
            "/verify-registration/{event_code}/{user_id}/{token}",
            get(inspect_registration_token).post(verify_registration_token),
        )
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
