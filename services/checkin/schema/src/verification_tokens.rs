use sea_orm::entity::prelude::*;

/// Unique index on `token`.
pub const TOKEN_UNIQUE_INDEX: &str = "idx_verification_tokens_token";

/// Partial unique index on `target_key` restricted to `status = 'active'`.
pub const ACTIVE_TARGET_UNIQUE_INDEX: &str = "idx_verification_tokens_active_target";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TokenStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "used")]
    Used,
    #[sea_orm(string_value = "expired")]
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TargetKind {
    #[sea_orm(string_value = "team_activity")]
    TeamActivity,
    #[sea_orm(string_value = "registration")]
    Registration,
}

/// QR check-in token. At most one `active` row per `target_key`
/// (partial unique index, see migration).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "verification_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub target_kind: TargetKind,
    pub target_key: String,
    pub team_id: Option<i64>,
    pub activity_id: Option<i64>,
    pub user_id: Option<i64>,
    pub event_id: Option<i64>,
    pub sub_event_id: Option<i64>,
    #[sea_orm(unique)]
    pub token: String,
    pub status: TokenStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub verified_by: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::VerifiedBy",
        to = "super::users::Column::Id"
    )]
    Verifier,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Verifier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
