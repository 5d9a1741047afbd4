use rusqlite::params;

use super::*;

const PROJECT_COLUMNS: &str = "id, name, code, owner_id, status, rag_status, start_date, end_date,
             budget, budget_spent, description, board_kind, is_mock";

impl DashboardDb {
    // =========================================================================
    // Projects
    // =========================================================================

    /// Helper: map a row to `DbProject`.
    pub(crate) fn map_project_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbProject> {
        Ok(DbProject {
            id: row.get(0)?,
            name: row.get(1)?,
            code: row.get(2)?,
            owner_id: row.get(3)?,
            status: row.get(4)?,
            rag_status: RagStatus::parse(&row.get::<_, String>(5)?),
            start_date: row.get(6)?,
            end_date: row.get(7)?,
            budget: row.get(8)?,
            budget_spent: row.get(9)?,
            description: row.get(10)?,
            board_kind: row.get(11)?,
            is_mock: row.get::<_, i64>(12)? != 0,
        })
    }

    /// Insert or update a project by id.
    pub fn upsert_project(&self, project: &DbProject) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO projects (
                id, name, code, owner_id, status, rag_status, start_date, end_date,
                budget, budget_spent, description, board_kind, is_mock
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                code = excluded.code,
                owner_id = excluded.owner_id,
                status = excluded.status,
                rag_status = excluded.rag_status,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                budget = excluded.budget,
                budget_spent = excluded.budget_spent,
                description = excluded.description,
                board_kind = excluded.board_kind",
            params![
                project.id,
                project.name,
                project.code,
                project.owner_id,
                project.status,
                project.rag_status.as_str(),
                project.start_date,
                project.end_date,
                project.budget,
                project.budget_spent,
                project.description,
                project.board_kind,
                project.is_mock as i64,
            ],
        )?;
        Ok(())
    }

    /// Get a project by ID.
    pub fn get_project(&self, id: &str) -> Result<Option<DbProject>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_project_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Get all projects, in insertion order.
    pub fn get_all_projects(&self) -> Result<Vec<DbProject>, DbError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects"))?;
        let rows = stmt.query_map([], Self::map_project_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Count all project rows. Seeding keys off this.
    pub fn count_projects(&self) -> Result<i64, DbError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?)
    }

    /// Update whitelisted fields on a project from a camelCase JSON object.
    ///
    /// Unknown keys are ignored rather than rejected; partial updates from
    /// the client carry whatever subset of fields changed.
    pub fn update_project_fields(
        &self,
        id: &str,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), DbError> {
        for (key, value) in fields {
            let column = match key.as_str() {
                "name" => "name",
                "code" => "code",
                "ownerId" => "owner_id",
                "status" => "status",
                "ragStatus" => "rag_status",
                "startDate" => "start_date",
                "endDate" => "end_date",
                "budget" => "budget",
                "budgetSpent" => "budget_spent",
                "description" => "description",
                "boardKind" => "board_kind",
                _ => continue,
            };
            let sql = format!("UPDATE projects SET {column} = ?1 WHERE id = ?2");
            match value {
                serde_json::Value::Number(n) => {
                    self.conn
                        .execute(&sql, params![n.as_i64().unwrap_or(0), id])?;
                }
                serde_json::Value::String(s) => {
                    self.conn.execute(&sql, params![s, id])?;
                }
                other => {
                    self.conn.execute(&sql, params![other.to_string(), id])?;
                }
            }
        }
        Ok(())
    }
}
