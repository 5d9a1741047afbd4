use rusqlite::params;

use super::*;

const STORY_COLUMNS: &str = "id, title, assignee_id, points, status, epic, sprint, week,
             project_id, description, acceptance_criteria, comments, pulled_date,
             risk_notes, blocker_notes, ai_mitigation, created_at, started_at,
             completed_at, is_mock";

/// Outcome of a bulk story insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkInsert {
    /// All rows inserted (count).
    Inserted(usize),
    /// Nothing inserted: these incoming ids already exist as non-mock rows.
    Duplicates(Vec<String>),
}

impl DashboardDb {
    // =========================================================================
    // Stories
    // =========================================================================

    pub(crate) fn map_story_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbStory> {
        Ok(DbStory {
            id: row.get(0)?,
            title: row.get(1)?,
            assignee_id: row.get(2)?,
            points: row.get(3)?,
            status: StoryStatus::parse(&row.get::<_, String>(4)?),
            epic: row.get(5)?,
            sprint: row.get(6)?,
            week: row.get(7)?,
            project_id: row.get(8)?,
            description: row.get(9)?,
            acceptance_criteria: row.get(10)?,
            comments: row.get(11)?,
            pulled_date: row.get(12)?,
            risk_notes: row.get(13)?,
            blocker_notes: row.get(14)?,
            ai_mitigation: row.get(15)?,
            created_at: row.get(16)?,
            started_at: row.get(17)?,
            completed_at: row.get(18)?,
            is_mock: row.get::<_, i64>(19)? != 0,
        })
    }

    /// Insert or update a single story by id, unconditionally.
    pub fn upsert_story(&self, story: &DbStory) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO stories (
                id, title, assignee_id, points, status, epic, sprint, week,
                project_id, description, acceptance_criteria, comments, pulled_date,
                risk_notes, blocker_notes, ai_mitigation, created_at, started_at,
                completed_at, is_mock
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                       ?15, ?16, ?17, ?18, ?19, ?20)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                assignee_id = excluded.assignee_id,
                points = excluded.points,
                status = excluded.status,
                epic = excluded.epic,
                sprint = excluded.sprint,
                week = excluded.week,
                project_id = excluded.project_id,
                description = excluded.description,
                acceptance_criteria = excluded.acceptance_criteria,
                comments = excluded.comments,
                pulled_date = excluded.pulled_date,
                risk_notes = excluded.risk_notes,
                blocker_notes = excluded.blocker_notes,
                ai_mitigation = excluded.ai_mitigation,
                created_at = excluded.created_at,
                started_at = excluded.started_at,
                completed_at = excluded.completed_at,
                is_mock = excluded.is_mock",
            params![
                story.id,
                story.title,
                story.assignee_id,
                story.points,
                story.status.as_str(),
                story.epic,
                story.sprint,
                story.week,
                story.project_id,
                story.description,
                story.acceptance_criteria,
                story.comments,
                story.pulled_date,
                story.risk_notes,
                story.blocker_notes,
                story.ai_mitigation,
                story.created_at,
                story.started_at,
                story.completed_at,
                story.is_mock as i64,
            ],
        )?;
        Ok(())
    }

    /// All-or-nothing bulk insert of imported stories.
    ///
    /// Duplicate-id pre-check runs against non-mock rows only, so a re-import
    /// over seeded demo data succeeds while a collision with user data is
    /// rejected wholesale. Inserted rows are always tagged `is_mock = 0`.
    pub fn bulk_insert_stories(&self, stories: &[DbStory]) -> Result<BulkInsert, DbError> {
        if stories.is_empty() {
            return Ok(BulkInsert::Inserted(0));
        }

        let placeholders = stories.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT id FROM stories WHERE id IN ({placeholders}) AND is_mock = 0"
        );
        let duplicates: Vec<String> = {
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(
                rusqlite::params_from_iter(stories.iter().map(|s| s.id.as_str())),
                |row| row.get::<_, String>(0),
            )?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        if !duplicates.is_empty() {
            return Ok(BulkInsert::Duplicates(duplicates));
        }

        self.with_transaction(|tx| {
            for story in stories {
                let mut row = story.clone();
                row.is_mock = false;
                tx.upsert_story(&row)?;
            }
            Ok(BulkInsert::Inserted(stories.len()))
        })
    }

    /// Get all stories, in insertion order.
    pub fn get_all_stories(&self) -> Result<Vec<DbStory>, DbError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {STORY_COLUMNS} FROM stories"))?;
        let rows = stmt.query_map([], Self::map_story_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Stories for a (project, week) scope.
    pub fn get_stories_for_week(
        &self,
        project_id: &str,
        week: &str,
    ) -> Result<Vec<DbStory>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {STORY_COLUMNS} FROM stories WHERE project_id = ?1 AND week = ?2"
        ))?;
        let rows = stmt.query_map(params![project_id, week], Self::map_story_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Update whitelisted fields on a story from a camelCase JSON object.
    pub fn update_story_fields(
        &self,
        id: &str,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), DbError> {
        for (key, value) in fields {
            let column = match key.as_str() {
                "title" => "title",
                "assigneeId" => "assignee_id",
                "points" => "points",
                "status" => "status",
                "epic" => "epic",
                "sprint" => "sprint",
                "week" => "week",
                "projectId" => "project_id",
                "description" => "description",
                "acceptanceCriteria" => "acceptance_criteria",
                "comments" => "comments",
                "pulledDate" => "pulled_date",
                "riskNotes" => "risk_notes",
                "blockerNotes" => "blocker_notes",
                "aiMitigation" => "ai_mitigation",
                "startedAt" => "started_at",
                "completedAt" => "completed_at",
                _ => continue,
            };
            let sql = format!("UPDATE stories SET {column} = ?1 WHERE id = ?2");
            match value {
                serde_json::Value::Number(n) => {
                    self.conn
                        .execute(&sql, params![n.as_i64().unwrap_or(0), id])?;
                }
                serde_json::Value::String(s) => {
                    self.conn.execute(&sql, params![s, id])?;
                }
                serde_json::Value::Null => {
                    self.conn
                        .execute(&sql, params![Option::<String>::None, id])?;
                }
                other => {
                    self.conn.execute(&sql, params![other.to_string(), id])?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{sample_story, test_db};
    use super::*;

    #[test]
    fn upsert_and_list_stories() {
        let db = test_db();
        db.upsert_story(&sample_story("CPR-101", "proj1", "2026-W08"))
            .expect("upsert");
        db.upsert_story(&sample_story("CPR-102", "proj1", "2026-W08"))
            .expect("upsert");

        let all = db.get_all_stories().expect("list");
        assert_eq!(all.len(), 2);

        let scoped = db
            .get_stories_for_week("proj1", "2026-W08")
            .expect("scoped");
        assert_eq!(scoped.len(), 2);
        assert!(db
            .get_stories_for_week("proj1", "2026-W09")
            .expect("other week")
            .is_empty());
    }

    #[test]
    fn bulk_insert_rejects_duplicates_all_or_nothing() {
        let db = test_db();
        // Existing user-entered (non-mock) row.
        db.upsert_story(&sample_story("A", "proj1", "2026-W08"))
            .expect("seed row");

        let incoming = vec![
            sample_story("A", "proj1", "2026-W09"),
            sample_story("B", "proj1", "2026-W09"),
        ];
        let outcome = db.bulk_insert_stories(&incoming).expect("bulk");
        assert_eq!(outcome, BulkInsert::Duplicates(vec!["A".to_string()]));

        // B must not have been inserted either.
        let all = db.get_all_stories().expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].week, "2026-W08", "existing row untouched");
    }

    #[test]
    fn bulk_insert_overwrites_mock_rows() {
        let db = test_db();
        let mut mock = sample_story("A", "proj1", "2026-W08");
        mock.is_mock = true;
        db.upsert_story(&mock).expect("mock row");

        let outcome = db
            .bulk_insert_stories(&[sample_story("A", "proj1", "2026-W09")])
            .expect("bulk");
        assert_eq!(outcome, BulkInsert::Inserted(1));

        let all = db.get_all_stories().expect("list");
        assert_eq!(all.len(), 1);
        assert!(!all[0].is_mock, "imported row is real data");
        assert_eq!(all[0].week, "2026-W09");
    }

    #[test]
    fn bulk_insert_empty_is_noop() {
        let db = test_db();
        let outcome = db.bulk_insert_stories(&[]).expect("bulk");
        assert_eq!(outcome, BulkInsert::Inserted(0));
    }

    #[test]
    fn partial_update_changes_status_and_week() {
        let db = test_db();
        db.upsert_story(&sample_story("CPR-101", "proj1", "2026-W08"))
            .expect("upsert");

        let fields = serde_json::json!({ "status": "done", "week": "2026-W09" });
        db.update_story_fields("CPR-101", fields.as_object().unwrap())
            .expect("update");

        let all = db.get_all_stories().expect("list");
        assert_eq!(all[0].status, StoryStatus::Done);
        // Re-import can move a story to a different week bucket.
        assert_eq!(all[0].week, "2026-W09");
    }
}
