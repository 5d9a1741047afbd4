//! HTTP server assembly.

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::api;
use crate::state::AppState;

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/data", get(api::get_data))
        .route("/api/seed", post(api::post_seed))
        .route("/api/seed/clear", delete(api::clear_mock))
        .route("/api/projects/upsert", post(api::upsert_project))
        .route("/api/projects/:id", put(api::update_project))
        .route("/api/stories", post(api::post_story))
        .route("/api/stories/bulk", post(api::bulk_stories))
        .route("/api/stories/:id", put(api::update_story))
        .route("/api/team_members", post(api::post_team_member))
        .route(
            "/api/team_members/:id",
            put(api::update_team_member).delete(api::delete_team_member),
        )
        .route(
            "/api/milestones",
            get(api::get_milestones).post(api::post_milestone),
        )
        .route(
            "/api/milestones/:id",
            put(api::update_milestone).delete(api::delete_milestone),
        )
        .route("/api/reports", post(api::post_report))
        .route("/api/kpis", get(api::get_kpis))
        .route("/api/confluence/publish", post(api::publish_confluence))
        .route("/api/ai/summarize-weekly", post(api::ai_summarize_weekly))
        .route("/api/ai/suggest-mitigation", post(api::ai_suggest_mitigation))
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(addr: &str, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Backend listening at http://{addr}");
    axum::serve(listener, router(state)).await
}
