use sea_orm_migration::prelude::*;

use confhub_checkin_schema::verification_tokens::{
    ACTIVE_TARGET_UNIQUE_INDEX, TOKEN_UNIQUE_INDEX,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(verification_tokens_table()).await?;

        manager
            .create_index(
                Index::create()
                    .table(VerificationTokens::Table)
                    .col(VerificationTokens::Token)
                    .unique()
                    .name(TOKEN_UNIQUE_INDEX)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(VerificationTokens::Table)
                    .col(VerificationTokens::TargetKey)
                    .name("idx_verification_tokens_target_key")
                    .to_owned(),
            )
            .await?;

        // sea-query has no portable partial-index builder.
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {ACTIVE_TARGET_UNIQUE_INDEX} \
                 ON verification_tokens (target_key) WHERE status = 'active'"
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerificationTokens::Table).to_owned())
            .await
    }
}

/// Verification stamps exist only on used tokens.
const VERIFIED_ONLY_WHEN_USED: &str =
    "status = 'used' OR (verified_at IS NULL AND verified_by IS NULL)";

fn verification_tokens_table() -> TableCreateStatement {
    Table::create()
        .table(VerificationTokens::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(VerificationTokens::Id)
                .uuid()
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(VerificationTokens::TargetKind)
                .string_len(16)
                .not_null(),
        )
        .col(
            ColumnDef::new(VerificationTokens::TargetKey)
                .string()
                .not_null(),
        )
        .col(ColumnDef::new(VerificationTokens::TeamId).big_integer())
        .col(ColumnDef::new(VerificationTokens::ActivityId).big_integer())
        .col(ColumnDef::new(VerificationTokens::UserId).big_integer())
        .col(ColumnDef::new(VerificationTokens::EventId).big_integer())
        .col(ColumnDef::new(VerificationTokens::SubEventId).big_integer())
        .col(
            ColumnDef::new(VerificationTokens::Token)
                .string_len(64)
                .not_null(),
        )
        .col(
            ColumnDef::new(VerificationTokens::Status)
                .string_len(16)
                .not_null()
                .default("active"),
        )
        .col(
            ColumnDef::new(VerificationTokens::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(ColumnDef::new(VerificationTokens::VerifiedAt).timestamp_with_time_zone())
        .col(ColumnDef::new(VerificationTokens::VerifiedBy).big_integer())
        .foreign_key(
            ForeignKey::create()
                .from(VerificationTokens::Table, VerificationTokens::VerifiedBy)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .check(
            Expr::col(VerificationTokens::Status)
                .is_in(["active", "used", "expired"]),
        )
        .check(Expr::cust(VERIFIED_ONLY_WHEN_USED))
        .to_owned()
}

#[derive(Iden)]
enum VerificationTokens {
    Table,
    Id,
    TargetKind,
    TargetKey,
    TeamId,
    ActivityId,
    UserId,
    EventId,
    SubEventId,
    Token,
    Status,
    CreatedAt,
    VerifiedAt,
    VerifiedBy,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
