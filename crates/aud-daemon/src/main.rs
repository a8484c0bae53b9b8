//! aud-daemon entry point.
//!
//! Thin by design: load config, connect + migrate the DB, build shared
//! state, wire middleware, serve. All route handlers live in `routes.rs`;
//! all shared state in `state.rs`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use aud_config::Settings;
use aud_daemon::{routes, state};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let settings = Settings::from_env().context("load settings")?;

    let pool = aud_db::connect(&settings.database_url).await.context("connect to postgres")?;
    aud_db::migrate(&pool).await.context("run migrations")?;

    let shared = Arc::new(state::AppState::new(pool, &settings));

    let app = routes::build_router(Arc::clone(&shared)).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let addr: SocketAddr = settings.daemon_addr.parse().context("parse AUDIT_DAEMON_ADDR")?;
    info!("aud-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await.context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}
