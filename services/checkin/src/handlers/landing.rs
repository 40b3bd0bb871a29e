use axum::response::Redirect;

use confhub_auth_types::identity::IdentityHeaders;

// ── GET /dashboard ───────────────────────────────────────────────────────────

/// Post-authentication redirect to the caller's role dashboard.
pub async fn dashboard(identity: IdentityHeaders) -> Redirect {
    Redirect::to(identity.user_role.landing_route())
}
