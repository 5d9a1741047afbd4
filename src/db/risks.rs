use rusqlite::params;

use super::*;

impl DashboardDb {
    // =========================================================================
    // Risk register
    // =========================================================================

    pub(crate) fn map_risk_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbRisk> {
        Ok(DbRisk {
            id: row.get(0)?,
            project_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            probability: row.get(4)?,
            impact: row.get(5)?,
            mitigation: row.get(6)?,
            owner_id: row.get(7)?,
            status: row.get(8)?,
            is_mock: row.get::<_, i64>(9)? != 0,
        })
    }

    pub fn upsert_risk(&self, risk: &DbRisk) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO risks (
                id, project_id, title, description, probability, impact, mitigation,
                owner_id, status, is_mock
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                project_id = excluded.project_id,
                title = excluded.title,
                description = excluded.description,
                probability = excluded.probability,
                impact = excluded.impact,
                mitigation = excluded.mitigation,
                owner_id = excluded.owner_id,
                status = excluded.status",
            params![
                risk.id,
                risk.project_id,
                risk.title,
                risk.description,
                risk.probability,
                risk.impact,
                risk.mitigation,
                risk.owner_id,
                risk.status,
                risk.is_mock as i64,
            ],
        )?;
        Ok(())
    }

    pub fn get_all_risks(&self) -> Result<Vec<DbRisk>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, title, description, probability, impact, mitigation,
                    owner_id, status, is_mock
             FROM risks",
        )?;
        let rows = stmt.query_map([], Self::map_risk_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use super::*;

    #[test]
    fn upsert_and_list_risks() {
        let db = test_db();
        db.upsert_risk(&DbRisk {
            id: "r1".to_string(),
            project_id: "proj1".to_string(),
            title: "API rate limits".to_string(),
            description: String::new(),
            probability: "medium".to_string(),
            impact: "critical".to_string(),
            mitigation: "Cache responses".to_string(),
            owner_id: "tm2".to_string(),
            status: "open".to_string(),
            is_mock: false,
        })
        .expect("upsert");

        let all = db.get_all_risks().expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].impact, "critical");
    }
}
