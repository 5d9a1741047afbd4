//! KPI aggregation.
//!
//! Pure functions deriving a read-only metrics snapshot from the raw entity
//! collections for a (project-or-all, week) scope. No caching: the snapshot
//! is recomputed fully on every call and has no side effects.
//!
//! "Latest sprint" means last in insertion order, not last by date. Callers
//! that need date determinism over unordered input must pre-sort sprints.

use serde::Serialize;

use crate::db::{
    DbLeaveEntry, DbMilestone, DbProject, DbRisk, DbSprint, DbStory, DbTeamMember, StoryStatus,
};

/// Weekly hours assumed per team member.
const HOURS_PER_MEMBER: i64 = 40;

/// Hours credited per completed story point when estimating utilization.
const HOURS_PER_POINT: i64 = 4;

/// The raw collections a snapshot is computed from.
#[derive(Debug, Clone, Copy)]
pub struct KpiInputs<'a> {
    pub projects: &'a [DbProject],
    pub team_members: &'a [DbTeamMember],
    pub stories: &'a [DbStory],
    pub milestones: &'a [DbMilestone],
    pub sprints: &'a [DbSprint],
    pub risks: &'a [DbRisk],
    pub leave_entries: &'a [DbLeaveEntry],
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRollup {
    pub delayed: usize,
    pub on_track: usize,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RiskRollup {
    pub open: usize,
    pub critical: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CapacityRollup {
    pub total: i64,
    pub available: i64,
    pub leave: i64,
    /// Estimated from completed story points, not logged time. A heuristic
    /// proxy, reported as such.
    pub utilization: i64,
}

/// Read-only KPI snapshot for one scope.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshot {
    pub avg_velocity: i64,
    pub latest_velocity: i64,
    pub latest_planned: i64,
    pub sprint_completion: i64,
    pub total_stories: usize,
    pub done_stories: usize,
    pub blocked_stories: usize,
    pub in_progress_stories: usize,
    pub budget_burn: i64,
    pub project_label: String,
    pub sprint_count: usize,
    pub milestones: MilestoneRollup,
    pub risks: RiskRollup,
    pub capacity: CapacityRollup,
    pub on_time_delivery: i64,
    pub is_all_projects: bool,
}

fn round_pct(numerator: f64, denominator: f64) -> i64 {
    (numerator / denominator * 100.0).round() as i64
}

/// Compute the KPI snapshot for a scope.
///
/// `project_id` of None (or empty) aggregates across all projects; `week` of
/// None (or empty) uses every story in scope rather than one week bucket.
pub fn compute_kpis(
    inputs: &KpiInputs<'_>,
    project_id: Option<&str>,
    week: Option<&str>,
) -> KpiSnapshot {
    let project_id = project_id.filter(|p| !p.is_empty());
    let week = week.filter(|w| !w.is_empty());
    let is_all = project_id.is_none();

    let project = project_id.and_then(|pid| inputs.projects.iter().find(|p| p.id == pid));

    let sprints: Vec<&DbSprint> = inputs
        .sprints
        .iter()
        .filter(|s| project_id.map_or(true, |pid| s.project_id == pid))
        .collect();
    let latest_sprint = sprints.last();

    let scope_stories: Vec<&DbStory> = inputs
        .stories
        .iter()
        .filter(|s| project_id.map_or(true, |pid| s.project_id == pid))
        .collect();
    let week_filtered: Vec<&&DbStory> = scope_stories
        .iter()
        .filter(|s| week.map_or(true, |w| s.week == w))
        .collect();

    // Sprint velocity
    let avg_velocity = if sprints.is_empty() {
        0
    } else {
        let total: i64 = sprints.iter().map(|s| s.completed_points).sum();
        (total as f64 / sprints.len() as f64).round() as i64
    };
    let latest_velocity = latest_sprint.map(|s| s.completed_points).unwrap_or(0);
    let latest_planned = latest_sprint.map(|s| s.planned_points).unwrap_or(1);
    // A sprint planned at zero points still completes; treat the divisor as 1.
    let sprint_completion = round_pct(latest_velocity as f64, latest_planned.max(1) as f64);

    // Story breakdown
    let count_status = |status: StoryStatus| {
        week_filtered
            .iter()
            .filter(|s| s.status == status)
            .count()
    };
    let total_stories = week_filtered.len();
    let done_stories = count_status(StoryStatus::Done);
    let blocked_stories = count_status(StoryStatus::Blocked);
    let in_progress_stories = count_status(StoryStatus::Inprogress);

    // Budget
    let (budget_total, budget_spent) = if is_all {
        inputs
            .projects
            .iter()
            .fold((0i64, 0i64), |(b, s), p| (b + p.budget, s + p.budget_spent))
    } else {
        project
            .map(|p| (p.budget, p.budget_spent))
            .unwrap_or((0, 0))
    };
    let budget_burn = if budget_total > 0 {
        round_pct(budget_spent as f64, budget_total as f64)
    } else {
        0
    };

    // Milestones
    let milestones: Vec<&DbMilestone> = inputs
        .milestones
        .iter()
        .filter(|m| project_id.map_or(true, |pid| m.project_id == pid))
        .collect();
    let milestone_rollup = MilestoneRollup {
        delayed: milestones.iter().filter(|m| m.status == "delayed").count(),
        on_track: milestones.iter().filter(|m| m.status == "on-track").count(),
        completed: milestones.iter().filter(|m| m.status == "completed").count(),
        total: milestones.len(),
    };

    // Risks
    let in_risk_scope =
        |r: &&DbRisk| project_id.map_or(true, |pid| r.project_id == pid) && r.status == "open";
    let risk_rollup = RiskRollup {
        open: inputs.risks.iter().filter(in_risk_scope).count(),
        critical: inputs
            .risks
            .iter()
            .filter(|r| in_risk_scope(r) && r.impact == "critical")
            .count(),
    };

    // Capacity. Leave only applies when a week is selected; without one no
    // entry matches, mirroring the all-weeks view.
    let team_size = inputs
        .team_members
        .iter()
        .filter(|m| m.app_role != "admin" && m.id != "admin0")
        .count() as i64;
    // An empty roster reads as the default six-person team.
    let team_size = if team_size == 0 { 6 } else { team_size };
    let total_capacity = team_size * HOURS_PER_MEMBER;
    let leave_taken: i64 = inputs
        .leave_entries
        .iter()
        .filter(|l| week.map_or(false, |w| l.week == w))
        .map(|l| l.hours_off)
        .sum();
    let available = (total_capacity - leave_taken).max(1);
    let done_points: i64 = week_filtered
        .iter()
        .filter(|s| s.status == StoryStatus::Done)
        .map(|s| s.points)
        .sum();
    let hours_worked = (done_points * HOURS_PER_POINT).min(available);
    let utilization = round_pct(hours_worked as f64, available as f64);

    // On-time delivery
    let on_time_delivery = if sprints.is_empty() {
        0
    } else {
        let on_time = sprints
            .iter()
            .filter(|s| s.completed_points >= s.planned_points)
            .count();
        round_pct(on_time as f64, sprints.len() as f64)
    };

    KpiSnapshot {
        avg_velocity,
        latest_velocity,
        latest_planned,
        sprint_completion,
        total_stories,
        done_stories,
        blocked_stories,
        in_progress_stories,
        budget_burn,
        project_label: if is_all {
            format!("All Projects ({})", inputs.projects.len())
        } else {
            project.map(|p| p.name.clone()).unwrap_or_default()
        },
        sprint_count: sprints.len(),
        milestones: milestone_rollup,
        risks: risk_rollup,
        capacity: CapacityRollup {
            total: total_capacity,
            available,
            leave: leave_taken,
            utilization,
        },
        on_time_delivery,
        is_all_projects: is_all,
    }
}
