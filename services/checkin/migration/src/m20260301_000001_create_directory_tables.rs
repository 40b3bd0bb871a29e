use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(Events::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SubEvents::EventId).big_integer().not_null())
                    .col(ColumnDef::new(SubEvents::Name).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(SubEvents::Table, SubEvents::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Activities::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Activities::EventId).big_integer().not_null())
                    .col(ColumnDef::new(Activities::Code).string().not_null())
                    .col(ColumnDef::new(Activities::Name).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Activities::Table, Activities::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Activities::Table)
                    .col(Activities::EventId)
                    .col(Activities::Code)
                    .unique()
                    .name("idx_activities_event_id_code")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Teams::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Teams::EventId).big_integer().not_null())
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Teams::Table, Teams::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Role,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
    Code,
    Name,
}

#[derive(Iden)]
enum SubEvents {
    Table,
    Id,
    EventId,
    Name,
}

#[derive(Iden)]
enum Activities {
    Table,
    Id,
    EventId,
    Code,
    Name,
}

#[derive(Iden)]
enum Teams {
    Table,
    Id,
    EventId,
    Name,
}
