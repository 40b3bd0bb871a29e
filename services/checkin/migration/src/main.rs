use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(confhub_checkin_migration::Migrator).await;
}
