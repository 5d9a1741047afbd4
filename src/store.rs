//! Client-side application state.
//!
//! One explicit state struct owned by one controller, with mutations
//! expressed as pure `(state, action) -> state` transitions so the table is
//! independently testable.
//!
//! Sync semantics: every mutating call against the backend is fire-and-forget
//! followed by an immediate local merge. There is no rollback path: when the
//! request fails, the local and server state diverge silently and the caller
//! only gets a warning to surface. `commit` reproduces exactly that.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{DataSnapshot, DbStory, DbWeeklyReport};

/// Role the UI is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Tpm,
    Director,
    Developer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// The whole client cache. Authoritative only until the next successful
/// fetch overwrites it.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub persona: Persona,
    pub selected_week: String,
    pub selected_project_id: String,
    pub data: DataSnapshot,
    pub theme: Theme,
}

impl DashboardState {
    pub fn new(persona: Persona, selected_week: String, selected_project_id: String) -> Self {
        Self {
            persona,
            selected_week,
            selected_project_id,
            data: DataSnapshot::default(),
            theme: Theme::Light,
        }
    }
}

/// Every mutation of the client state.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the cached collections with a fresh server snapshot.
    ReplaceData(Box<DataSnapshot>),
    SetPersona(Persona),
    SetWeek(String),
    SetProject(String),
    AddStory(Box<DbStory>),
    UpdateStory(Box<DbStory>),
    AddReport(Box<DbWeeklyReport>),
    UpdateReport(Box<DbWeeklyReport>),
    ToggleTheme,
}

/// The pure transition function.
///
/// Update actions targeting an id that isn't cached are no-ops; the next
/// full fetch reconciles.
pub fn reduce(mut state: DashboardState, action: Action) -> DashboardState {
    match action {
        Action::ReplaceData(snapshot) => state.data = *snapshot,
        Action::SetPersona(persona) => state.persona = persona,
        Action::SetWeek(week) => state.selected_week = week,
        Action::SetProject(project_id) => state.selected_project_id = project_id,
        Action::AddStory(story) => state.data.stories.push(*story),
        Action::UpdateStory(story) => {
            if let Some(slot) = state.data.stories.iter_mut().find(|s| s.id == story.id) {
                *slot = *story;
            }
        }
        Action::AddReport(report) => state.data.weekly_reports.push(*report),
        Action::UpdateReport(report) => {
            if let Some(slot) = state
                .data
                .weekly_reports
                .iter_mut()
                .find(|r| r.id == report.id)
            {
                *slot = *report;
            }
        }
        Action::ToggleTheme => {
            state.theme = match state.theme {
                Theme::Light => Theme::Dark,
                Theme::Dark => Theme::Light,
            }
        }
    }
    state
}

// ============================================================================
// Optimistic sync
// ============================================================================

/// Acknowledgement from a mutating backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Merge an optimistic mutation into the state.
///
/// The local update is applied whether or not the backend call succeeded;
/// the documented default is "keep optimistic state". The error, if any, is
/// handed back for the caller to surface as a transient toast without
/// blocking further interaction.
pub fn commit(
    state: DashboardState,
    action: Action,
    outcome: Result<Ack, SyncError>,
) -> (DashboardState, Option<SyncError>) {
    (reduce(state, action), outcome.err())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{RagStatus, ReportStatus, StoryStatus};

    fn base_state() -> DashboardState {
        DashboardState::new(Persona::Tpm, "2026-W08".into(), "proj1".into())
    }

    fn story(id: &str) -> DbStory {
        DbStory {
            id: id.to_string(),
            title: format!("Story {id}"),
            assignee_id: "tm1".to_string(),
            points: 5,
            status: StoryStatus::Todo,
            epic: String::new(),
            sprint: String::new(),
            week: "2026-W08".to_string(),
            project_id: "proj1".to_string(),
            description: None,
            acceptance_criteria: None,
            comments: None,
            pulled_date: None,
            risk_notes: None,
            blocker_notes: None,
            ai_mitigation: None,
            created_at: None,
            started_at: None,
            completed_at: None,
            is_mock: false,
        }
    }

    fn report(id: &str) -> DbWeeklyReport {
        DbWeeklyReport {
            id: id.to_string(),
            project_id: "proj1".to_string(),
            week: "2026-W08".to_string(),
            rag_status: RagStatus::Green,
            accomplishments: String::new(),
            next_week_plan: String::new(),
            risks_mitigation: String::new(),
            blockers: String::new(),
            prepared_by: "Kavita Singh".to_string(),
            approved_by: None,
            status: ReportStatus::Submitted,
            approval_comment: None,
            created_at: String::new(),
            updated_at: String::new(),
            is_mock: false,
        }
    }

    #[test]
    fn add_and_update_story() {
        let state = reduce(base_state(), Action::AddStory(Box::new(story("a"))));
        assert_eq!(state.data.stories.len(), 1);

        let mut changed = story("a");
        changed.status = StoryStatus::Done;
        let state = reduce(state, Action::UpdateStory(Box::new(changed)));
        assert_eq!(state.data.stories[0].status, StoryStatus::Done);
        // The rest of the state is untouched.
        assert_eq!(state.selected_week, "2026-W08");
        assert_eq!(state.persona, Persona::Tpm);
    }

    #[test]
    fn update_unknown_story_is_noop() {
        let state = reduce(base_state(), Action::UpdateStory(Box::new(story("ghost"))));
        assert!(state.data.stories.is_empty());
    }

    #[test]
    fn update_report_replaces_by_id() {
        let state = reduce(base_state(), Action::AddReport(Box::new(report("wr1"))));
        let mut approved = report("wr1");
        approved.status = ReportStatus::Approved;
        let state = reduce(state, Action::UpdateReport(Box::new(approved)));
        assert_eq!(state.data.weekly_reports[0].status, ReportStatus::Approved);
    }

    #[test]
    fn selection_actions_change_only_their_field() {
        let state = reduce(base_state(), Action::SetWeek("2026-W09".into()));
        let state = reduce(state, Action::SetProject("proj2".into()));
        let state = reduce(state, Action::SetPersona(Persona::Director));
        assert_eq!(state.selected_week, "2026-W09");
        assert_eq!(state.selected_project_id, "proj2");
        assert_eq!(state.persona, Persona::Director);
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn toggle_theme_round_trips() {
        let state = reduce(base_state(), Action::ToggleTheme);
        assert_eq!(state.theme, Theme::Dark);
        let state = reduce(state, Action::ToggleTheme);
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn replace_data_overwrites_cache() {
        let state = reduce(base_state(), Action::AddStory(Box::new(story("stale"))));
        let snapshot = DataSnapshot {
            stories: vec![story("fresh")],
            ..DataSnapshot::default()
        };
        let state = reduce(state, Action::ReplaceData(Box::new(snapshot)));
        assert_eq!(state.data.stories.len(), 1);
        assert_eq!(state.data.stories[0].id, "fresh");
    }

    #[test]
    fn failed_sync_keeps_optimistic_state() {
        // The acknowledged weak point, surfaced rather than masked: the local
        // update survives a failed request and the two sides diverge.
        let (state, warning) = commit(
            base_state(),
            Action::AddStory(Box::new(story("optimistic"))),
            Err(SyncError::Unreachable("connection refused".into())),
        );
        assert_eq!(state.data.stories.len(), 1, "no rollback on failure");
        assert!(matches!(warning, Some(SyncError::Unreachable(_))));
    }

    #[test]
    fn successful_sync_has_no_warning() {
        let (state, warning) = commit(
            base_state(),
            Action::AddStory(Box::new(story("a"))),
            Ok(Ack),
        );
        assert_eq!(state.data.stories.len(), 1);
        assert!(warning.is_none());
    }
}
