use std::net::SocketAddr;

use axum::{
    http::{Method, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::response::ApiResponse;
use crate::state::AppState;
use crate::{auth, comments};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(comments::router())
                .route("/health", get(health)),
        )
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn index() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::with_message(
        "TeachMe Anatomy API is running!",
        json!({
            "version": "1.0.0",
            "endpoints": {
                "auth": {
                    "register": "POST /api/auth/register",
                    "login": "POST /api/auth/login",
                    "me": "GET /api/auth/me",
                    "logout": "POST /api/auth/logout"
                },
                "comments": {
                    "list": "GET /api/comments/:articleId",
                    "create": "POST /api/comments",
                    "delete": "DELETE /api/comments/:id",
                    "like": "POST /api/comments/:id/like"
                },
                "health": "GET /api/health"
            }
        }),
    ))
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<ApiResponse<Health>> {
    Json(ApiResponse::ok(Health { status: "healthy" }))
}

async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(format!(
            "Route {} {} not found",
            method,
            uri.path()
        ))),
    )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
