//! Board import normalization.
//!
//! Maps heterogeneous spreadsheet exports (scrum, kanban, and Azure-Boards
//! style column headers) onto the canonical story shape. Both the status
//! keywords and the column aliases are explicit ordered rule lists; first
//! match wins, and the order is part of the contract.
//!
//! Status precedence is progress → done → blocked → todo, so a status like
//! "blocked - in progress" normalizes to inprogress.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use uuid::Uuid;

use crate::db::{DbProject, DbStory, RagStatus, StoryStatus};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("File is empty or invalid format")]
    EmptySheet,

    #[error("Project '{0}' is referenced without a name; import rejected")]
    MissingProjectName(String),
}

/// Ordered status keyword rules. Each entry is (substrings, result); the
/// first rule with any substring present in the lowercased status wins.
const STATUS_RULES: &[(&[&str], StoryStatus)] = &[
    (&["progress", "active", "doing"], StoryStatus::Inprogress),
    (
        &["done", "closed", "resolved", "completed"],
        StoryStatus::Done,
    ),
    (&["block", "impeded"], StoryStatus::Blocked),
];

const ID_ALIASES: &[&str] = &["Story ID", "ID", "Issue key"];
const TITLE_ALIASES: &[&str] = &["Title", "Summary"];
const STATUS_ALIASES: &[&str] = &["Status", "State"];
const POINTS_ALIASES: &[&str] = &["Story Points", "Story Point", "Effort", "Estimate"];
const SPRINT_ALIASES: &[&str] = &["Sprint", "Iteration Path"];
const ASSIGNEE_ALIASES: &[&str] = &["Assignee", "Assigned To"];
const EPIC_ALIASES: &[&str] = &["Epic", "Area Path"];
const PROJECT_ID_ALIASES: &[&str] = &["Project ID", "Project Code"];
const PROJECT_NAME_ALIASES: &[&str] = &["Project Name"];
const WEEK_ALIASES: &[&str] = &["Week"];

/// A spreadsheet row: header → cell text.
pub type Row = HashMap<String, String>;

/// Result of normalizing a sheet: the story list plus the de-duplicated
/// projects referenced by the rows. The caller upserts projects first;
/// foreign-key ordering is a caller contract, not enforced here.
#[derive(Debug, Clone)]
pub struct BoardImport {
    pub stories: Vec<DbStory>,
    pub projects: Vec<DbProject>,
}

/// Normalize a raw status string through the ordered rule list.
pub fn normalize_status(raw: &str) -> StoryStatus {
    let lowered = raw.to_lowercase();
    for (needles, status) in STATUS_RULES {
        if needles.iter().any(|n| lowered.contains(n)) {
            return *status;
        }
    }
    StoryStatus::Todo
}

/// First non-empty cell among the aliased headers.
fn pick<'a>(row: &'a Row, aliases: &[&str]) -> Option<&'a str> {
    for alias in aliases {
        if let Some(value) = row.get(*alias) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
    }
    None
}

fn pick_points(row: &Row) -> i64 {
    pick(row, POINTS_ALIASES)
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v as i64)
        .unwrap_or(0)
}

/// Normalize parsed rows into stories plus the project set they reference.
///
/// Rows without an explicit project column fall back to `default_project_id`
/// (assumed to already exist). Every explicitly referenced project id must
/// carry a non-blank name on at least one of its rows, or the whole import
/// fails.
pub fn normalize_rows(
    rows: &[Row],
    default_project_id: &str,
    default_week: &str,
    now: &str,
) -> Result<BoardImport, ImportError> {
    if rows.is_empty() {
        return Err(ImportError::EmptySheet);
    }

    let mut stories = Vec::with_capacity(rows.len());
    // id → name seen so far; insertion order preserved separately.
    let mut project_names: HashMap<String, String> = HashMap::new();
    let mut project_order: Vec<String> = Vec::new();

    for row in rows {
        let id = pick(row, ID_ALIASES)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!("TMP-{}", &Uuid::new_v4().simple().to_string()[..8].to_uppercase())
            });
        let title = pick(row, TITLE_ALIASES).unwrap_or("Untitled").to_string();
        let status = normalize_status(pick(row, STATUS_ALIASES).unwrap_or("To Do"));

        let project_id = match pick(row, PROJECT_ID_ALIASES) {
            Some(pid) => {
                let name = pick(row, PROJECT_NAME_ALIASES).unwrap_or("");
                let entry = project_names.entry(pid.to_string()).or_insert_with(|| {
                    project_order.push(pid.to_string());
                    String::new()
                });
                if entry.is_empty() && !name.is_empty() {
                    *entry = name.to_string();
                }
                pid.to_string()
            }
            None => default_project_id.to_string(),
        };

        stories.push(DbStory {
            id,
            title,
            assignee_id: pick(row, ASSIGNEE_ALIASES).unwrap_or("Unassigned").to_string(),
            points: pick_points(row),
            status,
            epic: pick(row, EPIC_ALIASES).unwrap_or("General").to_string(),
            sprint: pick(row, SPRINT_ALIASES).unwrap_or("Backlog").to_string(),
            week: pick(row, WEEK_ALIASES).unwrap_or(default_week).to_string(),
            project_id,
            description: row.get("Description").cloned().filter(|d| !d.is_empty()),
            acceptance_criteria: None,
            comments: None,
            pulled_date: None,
            risk_notes: None,
            blocker_notes: None,
            ai_mitigation: None,
            created_at: Some(now.to_string()),
            started_at: None,
            completed_at: None,
            is_mock: false,
        });
    }

    // Hard validation: every distinct project referenced must carry a name.
    let mut projects = Vec::with_capacity(project_order.len());
    for pid in project_order {
        let name = project_names.remove(&pid).unwrap_or_default();
        if name.trim().is_empty() {
            return Err(ImportError::MissingProjectName(pid));
        }
        let code: String = pid.chars().take(8).collect::<String>().to_uppercase();
        projects.push(DbProject {
            id: pid,
            name,
            code,
            owner_id: "admin0".to_string(),
            status: "on-track".to_string(),
            rag_status: RagStatus::Green,
            start_date: now.get(..10).unwrap_or("").to_string(),
            end_date: String::new(),
            budget: 0,
            budget_spent: 0,
            description: String::new(),
            board_kind: "scrum".to_string(),
            is_mock: false,
        });
    }

    Ok(BoardImport { stories, projects })
}

// ============================================================================
// Workbook adapter
// ============================================================================

fn cell_to_string(cell: &calamine::Data) -> String {
    use calamine::Data;
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => format!("{}", f),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR({:?})", e),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Read the first sheet of a workbook as header-keyed rows.
///
/// Blank rows are skipped; header cells are trimmed.
pub fn read_workbook(path: &Path) -> Result<Vec<Row>, ImportError> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| ImportError::Workbook(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::EmptySheet)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::Workbook(e.to_string()))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .ok_or(ImportError::EmptySheet)?
        .iter()
        .map(|c| cell_to_string(c).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for raw in rows_iter {
        let mut row = Row::new();
        let mut any = false;
        for (header, cell) in headers.iter().zip(raw.iter()) {
            let value = cell_to_string(cell);
            if !value.trim().is_empty() {
                any = true;
            }
            row.insert(header.clone(), value);
        }
        if any {
            rows.push(row);
        }
    }

    Ok(rows)
}
