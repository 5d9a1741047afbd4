//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

/// Red/Amber/Green health indicator for a project or report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RagStatus {
    #[default]
    Green,
    Amber,
    Red,
}

impl RagStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Amber => "amber",
            Self::Red => "red",
        }
    }

    /// Parse a stored value; anything unrecognized reads as green.
    pub fn parse(s: &str) -> Self {
        match s {
            "amber" => Self::Amber,
            "red" => Self::Red,
            _ => Self::Green,
        }
    }
}

/// Workflow state of a story on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    Todo,
    Inprogress,
    Done,
    Blocked,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Inprogress => "inprogress",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }

    /// Parse a stored value; anything unrecognized reads as todo.
    pub fn parse(s: &str) -> Self {
        match s {
            "inprogress" => Self::Inprogress,
            "done" => Self::Done,
            "blocked" => Self::Blocked,
            _ => Self::Todo,
        }
    }
}

/// Lifecycle state of a weekly report.
///
/// `Draft` exists as the conceptual initial state only; the first save of a
/// report always lands it in `Submitted`, so `Draft` is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "draft" => Self::Draft,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Submitted,
        }
    }
}

/// A row from the `projects` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbProject {
    pub id: String,
    pub name: String,
    pub code: String,
    pub owner_id: String,
    pub status: String,
    pub rag_status: RagStatus,
    pub start_date: String,
    pub end_date: String,
    pub budget: i64,
    pub budget_spent: i64,
    pub description: String,
    /// Board methodology: scrum | kanban | azure_boards.
    pub board_kind: String,
    #[serde(default)]
    pub is_mock: bool,
}

/// A row from the `team_members` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbTeamMember {
    pub id: String,
    pub name: String,
    /// Display role, free text ("Backend Engineer").
    pub role: String,
    /// Application role: tpm | director | developer | admin.
    pub app_role: String,
    pub avatar: String,
    pub email: String,
    pub weekly_hours: i64,
    #[serde(default)]
    pub is_mock: bool,
}

/// A row from the `stories` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStory {
    pub id: String,
    pub title: String,
    pub assignee_id: String,
    pub points: i64,
    pub status: StoryStatus,
    pub epic: String,
    pub sprint: String,
    /// ISO week bucket, YYYY-Www.
    pub week: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulled_date: Option<String>,
    /// Free-text risk/mitigation attached to the story; independent of the
    /// team risk register and never reconciled with it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocker_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_mitigation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub is_mock: bool,
}

/// A row from the `milestones` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbMilestone {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub target_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_date: Option<String>,
    /// on-track | at-risk | delayed | completed.
    pub status: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default)]
    pub is_mock: bool,
}

/// A row from the `sprints` table.
///
/// `completed_points` is entered independently of story points; no invariant
/// ties it to the sum of the sprint's stories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSprint {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub planned_points: i64,
    pub completed_points: i64,
    pub week: String,
    #[serde(default)]
    pub is_mock: bool,
}

/// A row from the `risks` table (team-level risk register).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbRisk {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: String,
    /// low | medium | high | critical.
    pub probability: String,
    pub impact: String,
    pub mitigation: String,
    pub owner_id: String,
    /// open | mitigated | closed.
    pub status: String,
    #[serde(default)]
    pub is_mock: bool,
}

/// A row from the `leave_entries` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbLeaveEntry {
    pub id: String,
    pub member_id: String,
    pub week: String,
    pub hours_off: i64,
    /// vacation | sick | holiday | wfh.
    pub kind: String,
    #[serde(default)]
    pub is_mock: bool,
}

/// A row from the `weekly_reports` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbWeeklyReport {
    pub id: String,
    pub project_id: String,
    pub week: String,
    pub rag_status: RagStatus,
    pub accomplishments: String,
    pub next_week_plan: String,
    pub risks_mitigation: String,
    pub blockers: String,
    pub prepared_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub is_mock: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_status_round_trip() {
        for s in [
            StoryStatus::Todo,
            StoryStatus::Inprogress,
            StoryStatus::Done,
            StoryStatus::Blocked,
        ] {
            assert_eq!(StoryStatus::parse(s.as_str()), s);
        }
        assert_eq!(StoryStatus::parse("garbage"), StoryStatus::Todo);
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = DbWeeklyReport {
            id: "wr1".into(),
            project_id: "proj1".into(),
            week: "2026-W08".into(),
            rag_status: RagStatus::Amber,
            accomplishments: "shipped".into(),
            next_week_plan: "more".into(),
            risks_mitigation: String::new(),
            blockers: String::new(),
            prepared_by: "Kavita Singh".into(),
            approved_by: None,
            status: ReportStatus::Submitted,
            approval_comment: None,
            created_at: "2026-02-23T10:00:00Z".into(),
            updated_at: "2026-02-23T10:00:00Z".into(),
            is_mock: false,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["projectId"], "proj1");
        assert_eq!(json["ragStatus"], "amber");
        assert_eq!(json["status"], "submitted");
        assert!(json.get("approvedBy").is_none());
    }
}
