use rusqlite::params;

use super::*;

impl DashboardDb {
    // =========================================================================
    // Team members
    // =========================================================================

    pub(crate) fn map_member_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbTeamMember> {
        Ok(DbTeamMember {
            id: row.get(0)?,
            name: row.get(1)?,
            role: row.get(2)?,
            app_role: row.get(3)?,
            avatar: row.get(4)?,
            email: row.get(5)?,
            weekly_hours: row.get(6)?,
            is_mock: row.get::<_, i64>(7)? != 0,
        })
    }

    pub fn insert_team_member(&self, member: &DbTeamMember) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO team_members (id, name, role, app_role, avatar, email, weekly_hours, is_mock)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                member.id,
                member.name,
                member.role,
                member.app_role,
                member.avatar,
                member.email,
                member.weekly_hours,
                member.is_mock as i64,
            ],
        )?;
        Ok(())
    }

    pub fn get_all_team_members(&self) -> Result<Vec<DbTeamMember>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, role, app_role, avatar, email, weekly_hours, is_mock
             FROM team_members",
        )?;
        let rows = stmt.query_map([], Self::map_member_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_team_member(&self, id: &str) -> Result<(), DbError> {
        self.conn
            .execute("DELETE FROM team_members WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Update whitelisted fields on a team member from a camelCase JSON object.
    pub fn update_team_member_fields(
        &self,
        id: &str,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), DbError> {
        for (key, value) in fields {
            let column = match key.as_str() {
                "name" => "name",
                "role" => "role",
                "appRole" => "app_role",
                "avatar" => "avatar",
                "email" => "email",
                "weeklyHours" => "weekly_hours",
                _ => continue,
            };
            let sql = format!("UPDATE team_members SET {column} = ?1 WHERE id = ?2");
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
