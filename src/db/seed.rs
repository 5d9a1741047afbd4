//! Demo dataset: three projects at different health levels plus the team,
//! sprints, stories, risks, leave, and submitted reports around them.
//!
//! Seeding only runs against an empty store and tags every row `is_mock = 1`
//! so `clear_mock_data` can remove the demo set without touching user data.

use super::*;

/// Outcome of a seed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOutcome {
    pub seeded: bool,
    pub message: &'static str,
}

const MOCK_TABLES: &[&str] = &[
    "stories",
    "projects",
    "team_members",
    "milestones",
    "sprints",
    "risks",
    "leave_entries",
    "weekly_reports",
];

impl DashboardDb {
    /// Seed the demo dataset, but only when the store is empty.
    ///
    /// Emptiness is keyed off the projects table; a store with any project
    /// row (mock or real) is left untouched.
    pub fn seed_if_empty(&self) -> Result<SeedOutcome, DbError> {
        if self.count_projects()? > 0 {
            return Ok(SeedOutcome {
                seeded: false,
                message: "Store already has data — skipping seed.",
            });
        }

        self.with_transaction(|tx| {
            tx.insert_seed_rows()?;
            Ok(())
        })?;
        log::info!("Demo data seed complete");

        Ok(SeedOutcome {
            seeded: true,
            message: "Demo data seeded successfully.",
        })
    }

    /// Delete all `is_mock = 1` rows across every table, in one transaction.
    pub fn clear_mock_data(&self) -> Result<(), DbError> {
        self.with_transaction(|tx| {
            for table in MOCK_TABLES {
                tx.conn_ref()
                    .execute(&format!("DELETE FROM {table} WHERE is_mock = 1"), [])?;
            }
            Ok(())
        })
    }

    fn insert_seed_rows(&self) -> Result<(), DbError> {
        for (id, name, code, kind, status, rag, start, end, budget, spent, desc) in [
            (
                "proj1",
                "Customer Portal Redesign",
                "CPR",
                "scrum",
                "on-track",
                RagStatus::Green,
                "2026-01-05",
                "2026-06-30",
                450_000,
                178_000,
                "Complete redesign of the customer-facing portal.",
            ),
            (
                "proj2",
                "Data Analytics Platform",
                "DAP",
                "kanban",
                "at-risk",
                RagStatus::Amber,
                "2026-01-12",
                "2026-08-31",
                620_000,
                310_000,
                "Real-time analytics and reporting platform.",
            ),
            (
                "proj3",
                "Mobile App V2",
                "MAV2",
                "azure_boards",
                "delayed",
                RagStatus::Red,
                "2025-11-01",
                "2026-04-30",
                280_000,
                195_000,
                "Second major version of the mobile app, offline-first.",
            ),
        ] {
            self.upsert_project(&DbProject {
                id: id.into(),
                name: name.into(),
                code: code.into(),
                owner_id: "tpm1".into(),
                status: status.into(),
                rag_status: rag,
                start_date: start.into(),
                end_date: end.into(),
                budget,
                budget_spent: spent,
                description: desc.into(),
                board_kind: kind.into(),
                is_mock: true,
            })?;
        }

        for (id, name, role, app_role, avatar, email) in [
            ("tm1", "Priya Sharma", "Frontend Lead", "developer", "PS", "priya@acme.com"),
            ("tm2", "Rahul Verma", "Backend Engineer", "developer", "RV", "rahul@acme.com"),
            ("tm3", "Sarah Chen", "QA Engineer", "developer", "SC", "sarah@acme.com"),
            ("tm4", "James Wilson", "DevOps Engineer", "developer", "JW", "james@acme.com"),
            ("tm5", "Meera Nair", "Full Stack Dev", "developer", "MN", "meera@acme.com"),
            ("tm6", "Alex Thompson", "Tech Lead", "developer", "AT", "alex@acme.com"),
            ("tpm1", "Kavita Singh", "TPM", "tpm", "KS", "kavita@acme.com"),
            ("dir1", "David Park", "Director of Engineering", "director", "DP", "david@acme.com"),
        ] {
            self.insert_team_member(&DbTeamMember {
                id: id.into(),
                name: name.into(),
                role: role.into(),
                app_role: app_role.into(),
                avatar: avatar.into(),
                email: email.into(),
                weekly_hours: 40,
                is_mock: true,
            })?;
        }

        for (id, project, name, start, end, planned, completed, week) in [
            ("sp1", "proj1", "Sprint 1", "2026-01-05", "2026-01-18", 42, 40, "2026-W02"),
            ("sp2", "proj1", "Sprint 2", "2026-01-19", "2026-02-01", 45, 43, "2026-W04"),
            ("sp3", "proj1", "Sprint 3", "2026-02-02", "2026-02-15", 48, 46, "2026-W06"),
            ("sp4", "proj1", "Sprint 4", "2026-02-16", "2026-03-01", 50, 39, "2026-W08"),
            ("sp5", "proj2", "Sprint 1", "2026-01-12", "2026-01-25", 38, 30, "2026-W03"),
            ("sp6", "proj2", "Sprint 2", "2026-01-26", "2026-02-08", 40, 28, "2026-W05"),
            ("sp7", "proj2", "Sprint 3", "2026-02-09", "2026-02-22", 42, 35, "2026-W07"),
            ("sp8", "proj3", "Sprint 5", "2026-01-05", "2026-01-18", 34, 26, "2026-W02"),
            ("sp9", "proj3", "Sprint 6", "2026-01-19", "2026-02-01", 36, 31, "2026-W04"),
            ("sp10", "proj3", "Sprint 7", "2026-02-02", "2026-02-15", 34, 28, "2026-W07"),
        ] {
            self.upsert_sprint(&DbSprint {
                id: id.into(),
                project_id: project.into(),
                name: name.into(),
                start_date: start.into(),
                end_date: end.into(),
                planned_points: planned,
                completed_points: completed,
                week: week.into(),
                is_mock: true,
            })?;
        }

        for (id, project, title, target, actual, status) in [
            ("ms1", "proj1", "Design System Complete", "2026-02-28", Some("2026-02-25"), "completed"),
            ("ms2", "proj1", "Alpha Release", "2026-03-31", None, "on-track"),
            ("ms3", "proj1", "Beta Launch", "2026-05-15", None, "on-track"),
            ("ms4", "proj2", "Data Ingestion Pipeline", "2026-02-15", Some("2026-02-22"), "delayed"),
            ("ms5", "proj2", "Dashboard v1", "2026-04-30", None, "at-risk"),
            ("ms6", "proj3", "iOS Beta", "2026-01-31", Some("2026-02-14"), "delayed"),
            ("ms7", "proj3", "App Store Release", "2026-04-30", None, "delayed"),
        ] {
            self.upsert_milestone(&DbMilestone {
                id: id.into(),
                project_id: project.into(),
                title: title.into(),
                target_date: target.into(),
                actual_date: actual.map(Into::into),
                status: status.into(),
                description: String::new(),
                start_date: None,
                is_mock: true,
            })?;
        }

        for (id, project, title, assignee, points, status, epic, sprint, week, risk, blocker) in [
            ("CPR-101", "proj1", "Dashboard layout responsive fix", "tm1", 5, StoryStatus::Done, "Dashboard", "Sprint 4", "2026-W08", "", ""),
            ("CPR-102", "proj1", "User profile API integration", "tm2", 8, StoryStatus::Done, "User Management", "Sprint 4", "2026-W08", "API rate limits - cache responses", ""),
            ("CPR-103", "proj1", "Notification system backend", "tm2", 8, StoryStatus::Inprogress, "Notifications", "Sprint 4", "2026-W08", "", "Needs queue infrastructure provisioned"),
            ("CPR-104", "proj1", "E2E test coverage for auth flow", "tm3", 5, StoryStatus::Done, "Auth", "Sprint 4", "2026-W08", "", ""),
            ("CPR-105", "proj1", "Search feature with filters", "tm1", 8, StoryStatus::Blocked, "Search", "Sprint 4", "2026-W08", "Elasticsearch dependency - consider fallback", "Elasticsearch cluster not provisioned yet"),
            ("DAP-201", "proj2", "Kafka stream connector setup", "tm2", 8, StoryStatus::Done, "Data Ingestion", "Sprint 3", "2026-W07", "", ""),
            ("DAP-202", "proj2", "User permissions for dashboards", "tm5", 8, StoryStatus::Inprogress, "User Management", "Sprint 3", "2026-W07", "Security review needed before release", "Waiting for security review sign-off"),
            ("DAP-203", "proj2", "Alert thresholds configuration", "tm2", 3, StoryStatus::Blocked, "Alerts", "Sprint 3", "2026-W07", "Architecture review pending", "Needs architecture decision on alerting engine"),
            ("DAP-204", "proj2", "ML model result display", "tm5", 5, StoryStatus::Todo, "ML", "Sprint 3", "2026-W07", "", ""),
            ("MAV2-301", "proj3", "Offline sync mechanism", "tm5", 13, StoryStatus::Inprogress, "Offline Mode", "Sprint 7", "2026-W07", "Conflict resolution complexity - spike needed", "Conflict resolution design not finalized"),
            ("MAV2-302", "proj3", "Push notification service", "tm2", 8, StoryStatus::Done, "Notifications", "Sprint 7", "2026-W07", "", ""),
            ("MAV2-303", "proj3", "Biometric auth integration", "tm5", 5, StoryStatus::Blocked, "Auth", "Sprint 7", "2026-W07", "Apple guidelines compliance risk - pre-review", "Awaiting Apple developer support feedback"),
        ] {
            self.upsert_story(&DbStory {
                id: id.into(),
                title: title.into(),
                assignee_id: assignee.into(),
                points,
                status,
                epic: epic.into(),
                sprint: sprint.into(),
                week: week.into(),
                project_id: project.into(),
                description: None,
                acceptance_criteria: None,
                comments: None,
                pulled_date: None,
                risk_notes: if risk.is_empty() { None } else { Some(risk.into()) },
                blocker_notes: if blocker.is_empty() { None } else { Some(blocker.into()) },
                ai_mitigation: None,
                created_at: None,
                started_at: None,
                completed_at: None,
                is_mock: true,
            })?;
        }

        for (id, project, title, probability, impact, mitigation, owner, status) in [
            ("r1", "proj1", "Third-party API rate limits", "medium", "high", "Implement caching and request queuing.", "tm2", "open"),
            ("r2", "proj1", "Design resource bandwidth", "high", "medium", "Contract design resource for 4 weeks.", "tpm1", "mitigated"),
            ("r3", "proj2", "Data governance approval delay", "high", "critical", "Escalate to CISO; interim data masking.", "dir1", "open"),
            ("r4", "proj3", "App Store review rejection risk", "medium", "critical", "Pre-review with Apple developer support.", "tm5", "open"),
        ] {
            self.upsert_risk(&DbRisk {
                id: id.into(),
                project_id: project.into(),
                title: title.into(),
                description: String::new(),
                probability: probability.into(),
                impact: impact.into(),
                mitigation: mitigation.into(),
                owner_id: owner.into(),
                status: status.into(),
                is_mock: true,
            })?;
        }

        for (id, member, week, hours, kind) in [
            ("lv1", "tm1", "2026-W08", 16, "vacation"),
            ("lv2", "tm3", "2026-W07", 8, "sick"),
            ("lv3", "tm4", "2026-W08", 8, "holiday"),
            ("lv4", "tm6", "2026-W07", 8, "wfh"),
        ] {
            self.upsert_leave_entry(&DbLeaveEntry {
                id: id.into(),
                member_id: member.into(),
                week: week.into(),
                hours_off: hours,
                kind: kind.into(),
                is_mock: true,
            })?;
        }

        for (id, project, week, rag, accomplishments, plan, blockers) in [
            (
                "wr1",
                "proj1",
                "2026-W08",
                RagStatus::Green,
                "• Responsive dashboard layout fixes complete\n• User profile API integrated",
                "• Finish notification backend (CPR-103)\n• Unblock search feature",
                "• Elasticsearch cluster provisioning pending",
            ),
            (
                "wr2",
                "proj2",
                "2026-W07",
                RagStatus::Amber,
                "• Kafka stream connector deployed to staging\n• CSV/Excel export shipped",
                "• Complete dashboard permission roles\n• Resolve alerting blocker",
                "• Data governance approval delayed — blocking production access",
            ),
            (
                "wr3",
                "proj3",
                "2026-W07",
                RagStatus::Red,
                "• Push notification service shipped\n• Android startup crash fixed",
                "• Resolve biometric auth blocker\n• Complete offline sync",
                "• Biometric auth blocked pending Apple feedback",
            ),
        ] {
            self.save_report(&DbWeeklyReport {
                id: id.into(),
                project_id: project.into(),
                week: week.into(),
                rag_status: rag,
                accomplishments: accomplishments.into(),
                next_week_plan: plan.into(),
                risks_mitigation: String::new(),
                blockers: blockers.into(),
                prepared_by: "Kavita Singh".into(),
                approved_by: None,
                status: ReportStatus::Submitted,
                approval_comment: None,
                created_at: "2026-02-20T10:00:00Z".into(),
                updated_at: "2026-02-20T10:00:00Z".into(),
                is_mock: true,
            })?;
        }

        Ok(())
    }
}
