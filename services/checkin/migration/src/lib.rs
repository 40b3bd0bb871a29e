use sea_orm_migration::prelude::*;

mod m20260301_000001_create_directory_tables;
mod m20260301_000002_create_verification_tokens;
mod m20260301_000003_create_event_registrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_directory_tables::Migration),
            Box::new(m20260301_000002_create_verification_tokens::Migration),
            Box::new(m20260301_000003_create_event_registrations::Migration),
        ]
    }
}
