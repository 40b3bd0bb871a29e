//! Mock auth helpers for integration tests.
//!
//! Services behind the gateway receive `x-confhub-user-id` + `x-confhub-user-role`
//! headers. `MockAuth` produces the same headers so no real gateway is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use confhub_auth_types::identity::{X_CONFHUB_USER_ID, X_CONFHUB_USER_ROLE};
use confhub_domain::id::UserId;
use confhub_domain::user::UserRole;

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: UserId,
    pub user_role: UserRole,
}

impl MockAuth {
    pub fn new(user_id: i64, user_role: UserRole) -> Self {
        Self {
            user_id: UserId(user_id),
            user_role,
        }
    }

    pub fn admin(user_id: i64) -> Self {
        Self::new(user_id, UserRole::Admin)
    }

    pub fn judge(user_id: i64) -> Self {
        Self::new(user_id, UserRole::Judge)
    }

    pub fn participant(user_id: i64) -> Self {
        Self::new(user_id, UserRole::Participant)
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(X_CONFHUB_USER_ID),
            HeaderValue::from(self.user_id.0),
        );
        map.insert(
            HeaderName::from_static(X_CONFHUB_USER_ROLE),
            HeaderValue::from_static(self.user_role.as_str()),
        );
        map
    }
}
