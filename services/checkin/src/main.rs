use sea_orm::Database;
use tracing::info;

use confhub_checkin::config::CheckinConfig;
use confhub_checkin::router::build_router;
use confhub_checkin::state::AppState;
use confhub_core::config::Config as _;
use confhub_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = CheckinConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState { db };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.checkin_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("checkin service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
