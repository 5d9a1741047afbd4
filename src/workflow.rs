//! Weekly report lifecycle.
//!
//! States: draft → submitted → approved | rejected. `draft` is conceptual
//! only; the first save of a report always lands in `submitted`, and a
//! rejected report re-submits straight back to `submitted`. No transition
//! removes a report.
//!
//! These are pure transition functions; persistence and the optimistic
//! client update happen elsewhere. The store never enforces this table;
//! it is the form contract the UI holds users to.

use thiserror::Error;
use uuid::Uuid;

use crate::db::{DbStory, DbWeeklyReport, RagStatus, ReportStatus, StoryStatus};

/// Comment recorded on a rejection when the director leaves none.
pub const DEFAULT_REJECTION_COMMENT: &str = "Please revise and resubmit.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Report is {from}; only submitted reports can be {action}")]
    NotSubmitted {
        from: &'static str,
        action: &'static str,
    },

    #[error("Approved reports are read-only")]
    ReadOnly,
}

/// The editable fields of the weekly report form.
#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    pub rag_status: RagStatus,
    pub accomplishments: String,
    pub next_week_plan: String,
    pub risks_mitigation: String,
    pub blockers: String,
}

/// Save a report form, transitioning to `submitted`.
///
/// When no report exists yet for the (project, week) pair a new id is
/// minted and `created_at` stamped; otherwise the existing row is carried
/// forward with the form fields overwritten. A prior rejection's approver
/// and comment are preserved until the next approval clears them.
pub fn submit(
    existing: Option<&DbWeeklyReport>,
    form: &ReportForm,
    project_id: &str,
    week: &str,
    prepared_by: &str,
    now: &str,
) -> Result<DbWeeklyReport, TransitionError> {
    if let Some(report) = existing {
        if report.status == ReportStatus::Approved {
            return Err(TransitionError::ReadOnly);
        }
        let mut updated = report.clone();
        updated.rag_status = form.rag_status;
        updated.accomplishments = form.accomplishments.clone();
        updated.next_week_plan = form.next_week_plan.clone();
        updated.risks_mitigation = form.risks_mitigation.clone();
        updated.blockers = form.blockers.clone();
        updated.status = ReportStatus::Submitted;
        updated.updated_at = now.to_string();
        return Ok(updated);
    }

    Ok(DbWeeklyReport {
        id: format!("wr-{}", Uuid::new_v4()),
        project_id: project_id.to_string(),
        week: week.to_string(),
        rag_status: form.rag_status,
        accomplishments: form.accomplishments.clone(),
        next_week_plan: form.next_week_plan.clone(),
        risks_mitigation: form.risks_mitigation.clone(),
        blockers: form.blockers.clone(),
        prepared_by: prepared_by.to_string(),
        approved_by: None,
        status: ReportStatus::Submitted,
        approval_comment: None,
        created_at: now.to_string(),
        updated_at: now.to_string(),
        is_mock: false,
    })
}

/// Approve a submitted report. Records the approver and clears any prior
/// rejection comment; the report becomes eligible for Confluence export.
pub fn approve(
    report: &DbWeeklyReport,
    approver: &str,
    now: &str,
) -> Result<DbWeeklyReport, TransitionError> {
    if report.status != ReportStatus::Submitted {
        return Err(TransitionError::NotSubmitted {
            from: report.status.as_str(),
            action: "approved",
        });
    }
    let mut approved = report.clone();
    approved.status = ReportStatus::Approved;
    approved.approved_by = Some(approver.to_string());
    approved.approval_comment = None;
    approved.updated_at = now.to_string();
    Ok(approved)
}

/// Reject a submitted report with an optional comment. The recorded comment
/// is never empty; a missing or blank one falls back to the default text.
pub fn reject(
    report: &DbWeeklyReport,
    approver: &str,
    comment: Option<&str>,
    now: &str,
) -> Result<DbWeeklyReport, TransitionError> {
    if report.status != ReportStatus::Submitted {
        return Err(TransitionError::NotSubmitted {
            from: report.status.as_str(),
            action: "rejected",
        });
    }
    let comment = comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_REJECTION_COMMENT);
    let mut rejected = report.clone();
    rejected.status = ReportStatus::Rejected;
    rejected.approved_by = Some(approver.to_string());
    rejected.approval_comment = Some(comment.to_string());
    rejected.updated_at = now.to_string();
    Ok(rejected)
}

// ============================================================================
// Report drafting from stories
// ============================================================================

/// Narrative fields composed from a week's stories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDraft {
    pub accomplishments: String,
    pub next_week_plan: String,
    pub risks_mitigation: String,
    pub blockers: String,
}

/// Compose report narrative fields from the stories of one (project, week)
/// scope. Returns None when the scope has no stories at all.
pub fn draft_from_stories(stories: &[DbStory]) -> Option<ReportDraft> {
    if stories.is_empty() {
        return None;
    }

    let mut accomplishments = Vec::new();
    for s in stories.iter().filter(|s| s.status == StoryStatus::Done) {
        accomplishments.push(format!("• [{}] {} — Done ({} pts)", s.id, s.title, s.points));
    }
    for s in stories
        .iter()
        .filter(|s| s.status == StoryStatus::Inprogress)
    {
        accomplishments.push(format!(
            "• [{}] {} — In Progress ({} pts)",
            s.id, s.title, s.points
        ));
    }

    let todo_lines: Vec<String> = stories
        .iter()
        .filter(|s| s.status == StoryStatus::Todo)
        .map(|s| format!("• [{}] {} — To Do ({} pts)", s.id, s.title, s.points))
        .collect();
    let next_week_plan = if todo_lines.is_empty() {
        "No pending stories found.".to_string()
    } else {
        todo_lines.join("\n")
    };

    let risks_mitigation = stories
        .iter()
        .filter_map(|s| {
            s.risk_notes
                .as_deref()
                .filter(|r| !r.is_empty())
                .map(|r| format!("• [{}] {}", s.id, r))
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut blocker_lines: Vec<String> = stories
        .iter()
        .filter(|s| s.status == StoryStatus::Blocked)
        .map(|s| format!("• [{}] {} — Blocked", s.id, s.title))
        .collect();
    blocker_lines.extend(stories.iter().filter_map(|s| {
        s.blocker_notes
            .as_deref()
            .filter(|b| !b.is_empty())
            .map(|b| format!("• [{}] {}", s.id, b))
    }));

    Some(ReportDraft {
        accomplishments: accomplishments.join("\n"),
        next_week_plan,
        risks_mitigation,
        blockers: blocker_lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted_report() -> DbWeeklyReport {
        submit(None, &ReportForm::default(), "proj1", "2026-W08", "Kavita Singh", "2026-02-23T10:00:00Z")
            .expect("new report")
    }

    fn story(id: &str, status: StoryStatus, points: i64) -> DbStory {
        DbStory {
            id: id.to_string(),
            title: format!("Story {id}"),
            assignee_id: "tm1".to_string(),
            points,
            status,
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

    #[test]
    fn first_save_mints_id_and_submits() {
        let report = submitted_report();
        assert!(report.id.starts_with("wr-"));
        assert_eq!(report.status, ReportStatus::Submitted, "draft never persists");
        assert_eq!(report.created_at, report.updated_at);
        assert!(report.approved_by.is_none());
    }

    #[test]
    fn resave_keeps_id_and_created_at() {
        let first = submitted_report();
        let form = ReportForm {
            accomplishments: "• shipped".to_string(),
            ..ReportForm::default()
        };
        let second = submit(
            Some(&first),
            &form,
            "proj1",
            "2026-W08",
            "Kavita Singh",
            "2026-02-24T09:00:00Z",
        )
        .expect("resave");

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.updated_at, "2026-02-24T09:00:00Z");
        assert_eq!(second.accomplishments, "• shipped");
    }

    #[test]
    fn approve_records_approver_and_clears_comment() {
        let report = submitted_report();
        let rejected = reject(&report, "David Park", Some("Needs detail"), "t1").expect("reject");
        let resubmitted = submit(
            Some(&rejected),
            &ReportForm::default(),
            "proj1",
            "2026-W08",
            "Kavita Singh",
            "t2",
        )
        .expect("resubmit");
        let approved = approve(&resubmitted, "David Park", "t3").expect("approve");

        assert_eq!(approved.status, ReportStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("David Park"));
        assert_eq!(approved.approval_comment, None, "prior rejection comment cleared");
    }

    #[test]
    fn reject_always_carries_a_comment() {
        let report = submitted_report();

        let with_comment =
            reject(&report, "David Park", Some("Numbers missing"), "t1").expect("reject");
        assert_eq!(with_comment.approval_comment.as_deref(), Some("Numbers missing"));

        let without = reject(&report, "David Park", None, "t1").expect("reject");
        assert_eq!(
            without.approval_comment.as_deref(),
            Some(DEFAULT_REJECTION_COMMENT)
        );

        let blank = reject(&report, "David Park", Some("   "), "t1").expect("reject");
        assert_eq!(
            blank.approval_comment.as_deref(),
            Some(DEFAULT_REJECTION_COMMENT)
        );
    }

    #[test]
    fn rejected_report_resubmits_to_submitted_not_draft() {
        let report = submitted_report();
        let rejected = reject(&report, "David Park", None, "t1").expect("reject");
        assert_eq!(rejected.status, ReportStatus::Rejected);

        let resubmitted = submit(
            Some(&rejected),
            &ReportForm::default(),
            "proj1",
            "2026-W08",
            "Kavita Singh",
            "t2",
        )
        .expect("resubmit");
        assert_eq!(resubmitted.status, ReportStatus::Submitted);
        assert_ne!(resubmitted.status, ReportStatus::Draft);
    }

    #[test]
    fn approved_report_is_read_only() {
        let approved = approve(&submitted_report(), "David Park", "t1").expect("approve");

        let err = submit(
            Some(&approved),
            &ReportForm::default(),
            "proj1",
            "2026-W08",
            "Kavita Singh",
            "t2",
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::ReadOnly);

        // Approving or rejecting again is also off the table.
        assert!(approve(&approved, "David Park", "t2").is_err());
        assert!(reject(&approved, "David Park", None, "t2").is_err());
    }

    #[test]
    fn draft_from_stories_buckets_by_status() {
        let mut risky = story("CPR-102", StoryStatus::Done, 8);
        risky.risk_notes = Some("API rate limits - cache responses".to_string());
        let mut blocked = story("CPR-107", StoryStatus::Blocked, 8);
        blocked.blocker_notes = Some("Cluster not provisioned".to_string());
        let stories = vec![
            story("CPR-101", StoryStatus::Done, 5),
            risky,
            story("CPR-103", StoryStatus::Inprogress, 8),
            story("CPR-110", StoryStatus::Todo, 3),
            blocked,
        ];

        let draft = draft_from_stories(&stories).expect("draft");
        assert!(draft.accomplishments.contains("[CPR-101] Story CPR-101 — Done (5 pts)"));
        assert!(draft.accomplishments.contains("[CPR-103] Story CPR-103 — In Progress (8 pts)"));
        assert!(draft.next_week_plan.contains("[CPR-110]"));
        assert!(draft.risks_mitigation.contains("API rate limits"));
        assert!(draft.blockers.contains("[CPR-107] Story CPR-107 — Blocked"));
        assert!(draft.blockers.contains("Cluster not provisioned"));
    }

    #[test]
    fn draft_from_no_stories_is_none() {
        assert_eq!(draft_from_stories(&[]), None);
    }

    #[test]
    fn draft_with_no_todos_says_so() {
        let stories = vec![story("a", StoryStatus::Done, 5)];
        let draft = draft_from_stories(&stories).expect("draft");
        assert_eq!(draft.next_week_plan, "No pending stories found.");
    }
}
