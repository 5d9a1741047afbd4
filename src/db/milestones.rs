use rusqlite::params;

use super::*;

const MILESTONE_COLUMNS: &str =
    "id, project_id, title, target_date, actual_date, status, description, start_date, is_mock";

impl DashboardDb {
    // =========================================================================
    // Milestones
    // =========================================================================

    pub(crate) fn map_milestone_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbMilestone> {
        Ok(DbMilestone {
            id: row.get(0)?,
            project_id: row.get(1)?,
            title: row.get(2)?,
            target_date: row.get(3)?,
            actual_date: row.get(4)?,
            status: row.get(5)?,
            description: row.get(6)?,
            start_date: row.get(7)?,
            is_mock: row.get::<_, i64>(8)? != 0,
        })
    }

    pub fn upsert_milestone(&self, milestone: &DbMilestone) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO milestones (
                id, project_id, title, target_date, actual_date, status, description,
                start_date, is_mock
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                project_id = excluded.project_id,
                title = excluded.title,
                target_date = excluded.target_date,
                actual_date = excluded.actual_date,
                status = excluded.status,
                description = excluded.description,
                start_date = excluded.start_date",
            params![
                milestone.id,
                milestone.project_id,
                milestone.title,
                milestone.target_date,
                milestone.actual_date,
                milestone.status,
                milestone.description,
                milestone.start_date,
                milestone.is_mock as i64,
            ],
        )?;
        Ok(())
    }

    /// All milestones, optionally filtered to one project.
    pub fn get_milestones(&self, project_id: Option<&str>) -> Result<Vec<DbMilestone>, DbError> {
        match project_id {
            Some(pid) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {MILESTONE_COLUMNS} FROM milestones WHERE project_id = ?1"
                ))?;
                let rows = stmt.query_map(params![pid], Self::map_milestone_row)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("SELECT {MILESTONE_COLUMNS} FROM milestones"))?;
                let rows = stmt.query_map([], Self::map_milestone_row)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            }
        }
    }

    pub fn delete_milestone(&self, id: &str) -> Result<(), DbError> {
        self.conn
            .execute("DELETE FROM milestones WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Update whitelisted fields on a milestone from a camelCase JSON object.
    pub fn update_milestone_fields(
        &self,
        id: &str,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), DbError> {
        for (key, value) in fields {
            let column = match key.as_str() {
                "projectId" => "project_id",
                "title" => "title",
                "targetDate" => "target_date",
                "actualDate" => "actual_date",
                "status" => "status",
                "description" => "description",
                "startDate" => "start_date",
                _ => continue,
            };
            let sql = format!("UPDATE milestones SET {column} = ?1 WHERE id = ?2");
            match value {
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
    use super::super::test_utils::test_db;
    use super::*;

    fn milestone(id: &str, project_id: &str, status: &str) -> DbMilestone {
        DbMilestone {
            id: id.to_string(),
            project_id: project_id.to_string(),
            title: format!("Milestone {id}"),
            target_date: "2026-03-31".to_string(),
            actual_date: None,
            status: status.to_string(),
            description: String::new(),
            start_date: None,
            is_mock: false,
        }
    }

    #[test]
    fn milestones_filter_by_project() {
        let db = test_db();
        db.upsert_milestone(&milestone("ms1", "proj1", "on-track"))
            .expect("upsert");
        db.upsert_milestone(&milestone("ms2", "proj2", "delayed"))
            .expect("upsert");

        assert_eq!(db.get_milestones(None).expect("all").len(), 2);
        let scoped = db.get_milestones(Some("proj1")).expect("scoped");
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, "ms1");
    }

    #[test]
    fn update_and_delete_milestone() {
        let db = test_db();
        db.upsert_milestone(&milestone("ms1", "proj1", "on-track"))
            .expect("upsert");

        let fields = serde_json::json!({ "status": "completed", "actualDate": "2026-02-25" });
        db.update_milestone_fields("ms1", fields.as_object().unwrap())
            .expect("update");

        let loaded = db.get_milestones(Some("proj1")).expect("get");
        assert_eq!(loaded[0].status, "completed");
        assert_eq!(loaded[0].actual_date.as_deref(), Some("2026-02-25"));

        db.delete_milestone("ms1").expect("delete");
        assert!(db.get_milestones(None).expect("all").is_empty());
    }
}
