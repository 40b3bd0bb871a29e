//! Gateway-injected identity headers extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;

use confhub_domain::id::UserId;
use confhub_domain::user::UserRole;

pub const X_CONFHUB_USER_ID: &str = "x-confhub-user-id";
pub const X_CONFHUB_USER_ROLE: &str = "x-confhub-user-role";

/// User identity injected by the gateway via `x-confhub-user-id` and `x-confhub-user-role` headers.
///
/// Returns 401 if either header is absent or unparsable.
/// Role enforcement (403) is done by use cases after extraction.
#[derive(Debug, Clone, Copy)]
pub struct IdentityHeaders {
    pub user_id: UserId,
    pub user_role: UserRole,
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 declares `fn -> impl Future + Send`; read the headers
    // synchronously so the returned future borrows nothing from `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = parts
            .headers
            .get(X_CONFHUB_USER_ID)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<UserId>().ok());

        let user_role = parts
            .headers
            .get(X_CONFHUB_USER_ROLE)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<UserRole>().ok());

        async move {
            let user_id = user_id.ok_or(StatusCode::UNAUTHORIZED)?;
            let user_role = user_role.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self { user_id, user_role })
        }
    }
}
