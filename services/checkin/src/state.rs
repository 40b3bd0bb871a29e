use sea_orm::DatabaseConnection;

use crate::infra::db::{DbTargetDirectory, DbVerificationTokenRepository};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn token_repo(&self) -> DbVerificationTokenRepository {
        DbVerificationTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn directory(&self) -> DbTargetDirectory {
        DbTargetDirectory {
            db: self.db.clone(),
        }
    }
}
