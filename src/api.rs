//! Route handlers.
//!
//! Every handler catches at the request boundary and answers with JSON; the
//! error taxonomy lives in [`crate::error`]. Mutations are simple
//! write-through CRUD with no retries and no caching; last write wins.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai;
use crate::confluence;
use crate::db::{
    BulkInsert, DataSnapshot, DbMilestone, DbProject, DbStory, DbTeamMember, DbWeeklyReport,
    RagStatus,
};
use crate::error::ApiError;
use crate::kpi::{self, KpiSnapshot};
use crate::state::AppState;

pub type SharedState = Arc<AppState>;

fn ok() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// Extract the JSON object from a partial-update body.
fn as_object(body: &Value) -> Result<&serde_json::Map<String, Value>, ApiError> {
    body.as_object()
        .ok_or_else(|| ApiError::Validation("Request body must be a JSON object".to_string()))
}

// ============================================================================
// Data + seed
// ============================================================================

pub async fn get_data(State(state): State<SharedState>) -> Result<Json<DataSnapshot>, ApiError> {
    let snapshot = state.db()?.load_snapshot()?;
    Ok(Json(snapshot))
}

pub async fn post_seed(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let outcome = state.db()?.seed_if_empty()?;
    Ok(Json(
        json!({ "seeded": outcome.seeded, "message": outcome.message }),
    ))
}

pub async fn clear_mock(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    state.db()?.clear_mock_data()?;
    Ok(Json(
        json!({ "success": true, "message": "All mock data cleared." }),
    ))
}

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpsertRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    board_kind: Option<String>,
    #[serde(default)]
    owner_id: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    budget: Option<i64>,
    #[serde(default)]
    budget_spent: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    rag_status: Option<RagStatus>,
}

pub async fn upsert_project(
    State(state): State<SharedState>,
    Json(req): Json<ProjectUpsertRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = req.id.filter(|v| !v.trim().is_empty());
    let name = req.name.filter(|v| !v.trim().is_empty());
    let (Some(id), Some(name)) = (id, name) else {
        return Err(ApiError::Validation("id and name are required".to_string()));
    };

    let default_code: String = id.chars().take(8).collect::<String>().to_uppercase();
    let project = DbProject {
        code: req.code.unwrap_or(default_code),
        board_kind: req.board_kind.unwrap_or_else(|| "scrum".to_string()),
        owner_id: req.owner_id.unwrap_or_else(|| "admin0".to_string()),
        start_date: req
            .start_date
            .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string()),
        end_date: req.end_date.unwrap_or_default(),
        budget: req.budget.unwrap_or(0),
        budget_spent: req.budget_spent.unwrap_or(0),
        description: req.description.unwrap_or_default(),
        status: req.status.unwrap_or_else(|| "on-track".to_string()),
        rag_status: req.rag_status.unwrap_or(RagStatus::Green),
        is_mock: false,
        id,
        name,
    };
    state.db()?.upsert_project(&project)?;
    Ok(ok())
}

pub async fn update_project(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.db()?.update_project_fields(&id, as_object(&body)?)?;
    Ok(ok())
}

// ============================================================================
// Stories
// ============================================================================

pub async fn post_story(
    State(state): State<SharedState>,
    Json(story): Json<DbStory>,
) -> Result<Json<Value>, ApiError> {
    state.db()?.upsert_story(&story)?;
    Ok(ok())
}

pub async fn update_story(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.db()?.update_story_fields(&id, as_object(&body)?)?;
    Ok(ok())
}

pub async fn bulk_stories(
    State(state): State<SharedState>,
    Json(stories): Json<Vec<DbStory>>,
) -> Result<Json<Value>, ApiError> {
    if stories.is_empty() {
        return Ok(ok());
    }
    match state.db()?.bulk_insert_stories(&stories)? {
        BulkInsert::Inserted(count) => Ok(Json(json!({ "success": true, "inserted": count }))),
        BulkInsert::Duplicates(duplicates) => Err(ApiError::Conflict {
            message: "Duplicate story IDs found. Upload rejected to protect existing data."
                .to_string(),
            duplicates,
        }),
    }
}

// ============================================================================
// Team members
// ============================================================================

pub async fn post_team_member(
    State(state): State<SharedState>,
    Json(member): Json<DbTeamMember>,
) -> Result<Json<Value>, ApiError> {
    state.db()?.insert_team_member(&member)?;
    Ok(ok())
}

pub async fn update_team_member(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state
        .db()?
        .update_team_member_fields(&id, as_object(&body)?)?;
    Ok(ok())
}

pub async fn delete_team_member(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.db()?.delete_team_member(&id)?;
    Ok(ok())
}

// ============================================================================
// Milestones
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MilestoneQuery {
    #[serde(rename = "projectId")]
    project_id: Option<String>,
}

pub async fn get_milestones(
    State(state): State<SharedState>,
    Query(query): Query<MilestoneQuery>,
) -> Result<Json<Vec<DbMilestone>>, ApiError> {
    let milestones = state.db()?.get_milestones(query.project_id.as_deref())?;
    Ok(Json(milestones))
}

pub async fn post_milestone(
    State(state): State<SharedState>,
    Json(milestone): Json<DbMilestone>,
) -> Result<Json<Value>, ApiError> {
    state.db()?.upsert_milestone(&milestone)?;
    Ok(ok())
}

pub async fn update_milestone(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.db()?.update_milestone_fields(&id, as_object(&body)?)?;
    Ok(ok())
}

pub async fn delete_milestone(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.db()?.delete_milestone(&id)?;
    Ok(ok())
}

// ============================================================================
// Weekly reports
// ============================================================================

pub async fn post_report(
    State(state): State<SharedState>,
    Json(report): Json<DbWeeklyReport>,
) -> Result<Json<Value>, ApiError> {
    state.db()?.save_report(&report)?;
    Ok(ok())
}

// ============================================================================
// KPIs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct KpiQuery {
    #[serde(rename = "projectId")]
    project_id: Option<String>,
    week: Option<String>,
}

/// Server-side KPI snapshot for a (project-or-all, week) scope: the same
/// aggregation the dashboard computes from its cached collections.
pub async fn get_kpis(
    State(state): State<SharedState>,
    Query(query): Query<KpiQuery>,
) -> Result<Json<KpiSnapshot>, ApiError> {
    let snapshot = state.db()?.load_snapshot()?;
    let inputs = kpi::KpiInputs {
        projects: &snapshot.projects,
        team_members: &snapshot.team_members,
        stories: &snapshot.stories,
        milestones: &snapshot.milestones,
        sprints: &snapshot.sprints,
        risks: &snapshot.risks,
        leave_entries: &snapshot.leave_entries,
    };
    Ok(Json(kpi::compute_kpis(
        &inputs,
        query.project_id.as_deref(),
        query.week.as_deref(),
    )))
}

// ============================================================================
// Confluence publish
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    report_row_html: String,
    week: String,
    project_id: String,
}

pub async fn publish_confluence(
    State(state): State<SharedState>,
    Json(req): Json<PublishRequest>,
) -> Result<Json<Value>, ApiError> {
    let config = state.confluence_config()?;
    confluence::publish_row(&config, &req.report_row_html, &req.week, &req.project_id).await?;
    Ok(ok())
}

// ============================================================================
// AI
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    project_id: String,
    week: String,
}

pub async fn ai_summarize_weekly(
    State(state): State<SharedState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<ai::WeeklySummary>, ApiError> {
    let config = state.ai_config()?;
    let stories = {
        let db = state.db()?;
        db.get_stories_for_week(&req.project_id, &req.week)?
    };
    if stories.is_empty() {
        return Err(ApiError::Validation(
            "No stories found for this project & week".to_string(),
        ));
    }

    let summary = ai::summarize_weekly(&config, &stories).await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MitigationRequest {
    #[serde(default)]
    risk_description: Option<String>,
}

pub async fn ai_suggest_mitigation(
    State(state): State<SharedState>,
    Json(req): Json<MitigationRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(risk) = req.risk_description.filter(|r| !r.trim().is_empty()) else {
        return Err(ApiError::Validation("Risk description is required".to_string()));
    };

    let config = state.ai_config()?;
    let mitigation = ai::suggest_mitigation(&config, &risk).await?;
    Ok(Json(json!({ "mitigation": mitigation })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{sample_story, test_db};
    use crate::db::StoryStatus;
    use axum::http::StatusCode;

    fn shared_state() -> SharedState {
        Arc::new(AppState::new(test_db()))
    }

    #[tokio::test]
    async fn seed_then_data_round_trip() {
        let state = shared_state();

        let Json(seeded) = post_seed(State(state.clone())).await.expect("seed");
        assert_eq!(seeded["seeded"], true);

        let Json(again) = post_seed(State(state.clone())).await.expect("re-seed");
        assert_eq!(again["seeded"], false, "seeding is idempotent");

        let Json(snapshot) = get_data(State(state)).await.expect("data");
        assert_eq!(snapshot.projects.len(), 3);
        assert_eq!(snapshot.team_members.len(), 8);
        assert!(!snapshot.weekly_reports.is_empty());
    }

    #[tokio::test]
    async fn clear_mock_empties_seeded_store() {
        let state = shared_state();
        post_seed(State(state.clone())).await.expect("seed");
        clear_mock(State(state.clone())).await.expect("clear");

        let Json(snapshot) = get_data(State(state)).await.expect("data");
        assert!(snapshot.projects.is_empty());
        assert!(snapshot.stories.is_empty());
    }

    #[tokio::test]
    async fn project_upsert_requires_id_and_name() {
        let state = shared_state();
        let req: ProjectUpsertRequest =
            serde_json::from_value(json!({ "id": "proj9" })).expect("deserialize");
        let err = upsert_project(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn project_upsert_applies_defaults() {
        let state = shared_state();
        let req: ProjectUpsertRequest =
            serde_json::from_value(json!({ "id": "northstar", "name": "North Star" }))
                .expect("deserialize");
        upsert_project(State(state.clone()), Json(req))
            .await
            .expect("upsert");

        let project = state
            .db()
            .expect("db")
            .get_project("northstar")
            .expect("get")
            .expect("exists");
        assert_eq!(project.code, "NORTHSTA", "first 8 chars, uppercased");
        assert_eq!(project.board_kind, "scrum");
        assert_eq!(project.owner_id, "admin0");
        assert_eq!(project.status, "on-track");
        assert_eq!(project.rag_status, RagStatus::Green);
        assert_eq!(project.budget, 0);
    }

    #[tokio::test]
    async fn bulk_conflict_carries_duplicates_list() {
        let state = shared_state();
        state
            .db()
            .expect("db")
            .upsert_story(&sample_story("A", "proj1", "2026-W08"))
            .expect("existing");

        let incoming = vec![
            sample_story("A", "proj1", "2026-W09"),
            sample_story("B", "proj1", "2026-W09"),
        ];
        let err = bulk_stories(State(state.clone()), Json(incoming))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        match err {
            ApiError::Conflict { duplicates, .. } => {
                assert_eq!(duplicates, vec!["A".to_string()])
            }
            other => panic!("expected conflict, got {other:?}"),
        }

        // All-or-nothing: B was not inserted.
        let stories = state.db().expect("db").get_all_stories().expect("list");
        assert_eq!(stories.len(), 1);
    }

    #[tokio::test]
    async fn bulk_empty_list_is_success() {
        let state = shared_state();
        let Json(body) = bulk_stories(State(state), Json(Vec::new()))
            .await
            .expect("bulk");
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn milestones_honor_project_filter() {
        let state = shared_state();
        post_seed(State(state.clone())).await.expect("seed");

        let Json(all) = get_milestones(
            State(state.clone()),
            Query(MilestoneQuery { project_id: None }),
        )
        .await
        .expect("all");
        let Json(scoped) = get_milestones(
            State(state),
            Query(MilestoneQuery {
                project_id: Some("proj1".to_string()),
            }),
        )
        .await
        .expect("scoped");
        assert!(scoped.len() < all.len());
        assert!(scoped.iter().all(|m| m.project_id == "proj1"));
    }

    #[tokio::test]
    async fn kpis_reflect_seeded_scope() {
        let state = shared_state();
        post_seed(State(state.clone())).await.expect("seed");

        let Json(snap) = get_kpis(
            State(state),
            Query(KpiQuery {
                project_id: Some("proj1".to_string()),
                week: Some("2026-W08".to_string()),
            }),
        )
        .await
        .expect("kpis");
        assert!(!snap.is_all_projects);
        assert_eq!(snap.sprint_count, 4);
        // Sprint 4: 39 of 50 planned.
        assert_eq!(snap.latest_velocity, 39);
        assert_eq!(snap.sprint_completion, 78);
        assert_eq!(snap.done_stories, 3);
        assert_eq!(snap.blocked_stories, 1);
    }

    #[tokio::test]
    async fn mitigation_requires_description() {
        let state = shared_state();
        let req = MitigationRequest {
            risk_description: None,
        };
        let err = ai_suggest_mitigation(State(state), Json(req))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn summarize_rejects_empty_scope_before_calling_provider() {
        let dir = tempfile::tempdir().expect("temp dir");
        let ai_path = dir.path().join("ai.json");
        std::fs::write(
            &ai_path,
            r#"{"ai": {"baseUrl": "http://127.0.0.1:1", "apiKey": "k", "model": "m"}}"#,
        )
        .expect("write config");
        let state = Arc::new(
            AppState::new(test_db())
                .with_config_paths(dir.path().join("confluence.json"), ai_path),
        );

        let req = SummarizeRequest {
            project_id: "proj1".to_string(),
            week: "2026-W08".to_string(),
        };
        let err = ai_summarize_weekly(State(state), Json(req))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn story_status_update_feeds_kpis() {
        let state = shared_state();
        let mut story = sample_story("CPR-1", "proj1", "2026-W08");
        story.status = StoryStatus::Todo;
        post_story(State(state.clone()), Json(story))
            .await
            .expect("post");

        update_story(
            State(state.clone()),
            Path("CPR-1".to_string()),
            Json(json!({ "status": "done" })),
        )
        .await
        .expect("update");

        let Json(snap) = get_kpis(
            State(state),
            Query(KpiQuery {
                project_id: Some("proj1".to_string()),
                week: Some("2026-W08".to_string()),
            }),
        )
        .await
        .expect("kpis");
        assert_eq!(snap.done_stories, 1);
    }
}
