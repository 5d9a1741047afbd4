use rusqlite::params;

use super::*;

impl DashboardDb {
    // =========================================================================
    // Sprints
    // =========================================================================

    pub(crate) fn map_sprint_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbSprint> {
        Ok(DbSprint {
            id: row.get(0)?,
            project_id: row.get(1)?,
            name: row.get(2)?,
            start_date: row.get(3)?,
            end_date: row.get(4)?,
            planned_points: row.get(5)?,
            completed_points: row.get(6)?,
            week: row.get(7)?,
            is_mock: row.get::<_, i64>(8)? != 0,
        })
    }

    pub fn upsert_sprint(&self, sprint: &DbSprint) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO sprints (
                id, project_id, name, start_date, end_date, planned_points,
                completed_points, week, is_mock
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                project_id = excluded.project_id,
                name = excluded.name,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                planned_points = excluded.planned_points,
                completed_points = excluded.completed_points,
                week = excluded.week",
            params![
                sprint.id,
                sprint.project_id,
                sprint.name,
                sprint.start_date,
                sprint.end_date,
                sprint.planned_points,
                sprint.completed_points,
                sprint.week,
                sprint.is_mock as i64,
            ],
        )?;
        Ok(())
    }

    /// All sprints, in insertion order. KPI "latest sprint" semantics depend
    /// on this order, not on dates.
    pub fn get_all_sprints(&self) -> Result<Vec<DbSprint>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, name, start_date, end_date, planned_points,
                    completed_points, week, is_mock
             FROM sprints",
        )?;
        let rows = stmt.query_map([], Self::map_sprint_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use super::*;

    #[test]
    fn sprints_preserve_insertion_order() {
        let db = test_db();
        for (i, id) in ["sp1", "sp2", "sp3"].iter().enumerate() {
            db.upsert_sprint(&DbSprint {
                id: id.to_string(),
                project_id: "proj1".to_string(),
                name: format!("Sprint {}", i + 1),
                start_date: "2026-01-05".to_string(),
                end_date: "2026-01-18".to_string(),
                planned_points: 40,
                completed_points: 35 + i as i64,
                week: "2026-W02".to_string(),
                is_mock: false,
            })
            .expect("upsert");
        }

        let all = db.get_all_sprints().expect("list");
        assert_eq!(all.len(), 3);
        assert_eq!(all.last().unwrap().id, "sp3");
        assert_eq!(all.last().unwrap().completed_points, 37);
    }
}
