use rusqlite::params;

use super::*;

impl DashboardDb {
    // =========================================================================
    // Leave entries
    // =========================================================================

    pub(crate) fn map_leave_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbLeaveEntry> {
        Ok(DbLeaveEntry {
            id: row.get(0)?,
            member_id: row.get(1)?,
            week: row.get(2)?,
            hours_off: row.get(3)?,
            kind: row.get(4)?,
            is_mock: row.get::<_, i64>(5)? != 0,
        })
    }

    pub fn upsert_leave_entry(&self, entry: &DbLeaveEntry) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO leave_entries (id, member_id, week, hours_off, kind, is_mock)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                member_id = excluded.member_id,
                week = excluded.week,
                hours_off = excluded.hours_off,
                kind = excluded.kind",
            params![
                entry.id,
                entry.member_id,
                entry.week,
                entry.hours_off,
                entry.kind,
                entry.is_mock as i64,
            ],
        )?;
        Ok(())
    }

    pub fn get_all_leave_entries(&self) -> Result<Vec<DbLeaveEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, member_id, week, hours_off, kind, is_mock FROM leave_entries",
        )?;
        let rows = stmt.query_map([], Self::map_leave_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use super::*;

    #[test]
    fn upsert_and_list_leave() {
        let db = test_db();
        db.upsert_leave_entry(&DbLeaveEntry {
            id: "lv1".to_string(),
            member_id: "tm1".to_string(),
            week: "2026-W08".to_string(),
            hours_off: 16,
            kind: "vacation".to_string(),
            is_mock: false,
        })
        .expect("upsert");

        let all = db.get_all_leave_entries().expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].hours_off, 16);
    }
}
