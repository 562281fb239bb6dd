use anyhow::Context;

mod app;
mod auth;
mod comments;
mod config;
mod error;
mod response;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "anatomy_backend=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    // Versioned migrations must apply before the service starts taking traffic
    sqlx::migrate!("./migrations")
        .run(&app_state.db)
        .await
        .context("apply migrations")?;

    if app_state.config.development {
        tracing::info!("running in development mode; error detail is exposed to clients");
    }

    let app = app::build_app(app_state);
    app::serve(app).await
}
