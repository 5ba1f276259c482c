pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    let app_state = state::AppState::new(root);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Leads
        .route("/api/leads", get(routes::leads::list_leads))
        .route("/api/leads", post(routes::leads::create_lead))
        .route("/api/leads/{id}", get(routes::leads::get_lead))
        .route("/api/leads/{id}", put(routes::leads::update_lead))
        .route("/api/leads/{id}", delete(routes::leads::delete_lead))
        .route("/api/leads/{id}/status", post(routes::leads::set_status))
        .route("/api/leads/{id}/restore", post(routes::leads::restore_lead))
        .route("/api/leads/{id}/notes", post(routes::leads::add_note))
        .route(
            "/api/leads/{id}/notes/{note_id}",
            put(routes::leads::update_note),
        )
        .route(
            "/api/leads/{id}/notes/{note_id}",
            delete(routes::leads::delete_note),
        )
        // KPIs
        .route("/api/kpis", get(routes::kpis::get_kpis))
        .route("/api/kpis/funnel", get(routes::kpis::get_funnel))
        .route("/api/kpis/utm", get(routes::kpis::get_utm_performance))
        .route("/api/kpis/trends", get(routes::kpis::get_trends))
        .route("/api/kpis/activity", get(routes::kpis::get_activity))
        // Status taxonomy
        .route("/api/statuses", get(routes::statuses::get_statuses))
        // Webhook (lead ingestion)
        .route("/api/webhook/leads", post(routes::webhook::ingest_lead))
        // Playbooks
        .route("/api/playbooks", get(routes::playbooks::list_playbooks))
        .route("/api/playbooks", post(routes::playbooks::create_playbook))
        .route("/api/playbooks/{slug}", get(routes::playbooks::get_playbook))
        .route("/api/playbooks/{slug}", put(routes::playbooks::update_playbook))
        .route(
            "/api/playbooks/{slug}",
            delete(routes::playbooks::delete_playbook),
        )
        .route(
            "/api/playbooks/{slug}/restore",
            post(routes::playbooks::restore_playbook),
        )
        .layer(cors)
        .with_state(app_state)
}

/// Start the leadflow API server.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let app = build_router(root);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("leadflow API server listening on http://localhost:{port}");

    if open_browser {
        let url = format!("http://localhost:{port}/api/kpis");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}

/// Start the server on a pre-bound listener, so the caller can read the
/// actual port first (useful when `port = 0` and the OS picks a free one).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root);

    tracing::info!("leadflow API server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
