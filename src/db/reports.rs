use rusqlite::params;

use super::*;

const REPORT_COLUMNS: &str = "id, project_id, week, rag_status, accomplishments, next_week_plan,
             risks_mitigation, blockers, prepared_by, approved_by, status,
             approval_comment, created_at, updated_at, is_mock";

impl DashboardDb {
    // =========================================================================
    // Weekly reports
    // =========================================================================

    pub(crate) fn map_report_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbWeeklyReport> {
        Ok(DbWeeklyReport {
            id: row.get(0)?,
            project_id: row.get(1)?,
            week: row.get(2)?,
            rag_status: RagStatus::parse(&row.get::<_, String>(3)?),
            accomplishments: row.get(4)?,
            next_week_plan: row.get(5)?,
            risks_mitigation: row.get(6)?,
            blockers: row.get(7)?,
            prepared_by: row.get(8)?,
            approved_by: row.get(9)?,
            status: ReportStatus::parse(&row.get::<_, String>(10)?),
            approval_comment: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
            is_mock: row.get::<_, i64>(14)? != 0,
        })
    }

    /// Insert-or-replace a weekly report by id.
    ///
    /// Whole-row replacement matches the save semantics of the report form:
    /// every save carries the full report, workflow fields included.
    pub fn save_report(&self, report: &DbWeeklyReport) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO weekly_reports (
                id, project_id, week, rag_status, accomplishments, next_week_plan,
                risks_mitigation, blockers, prepared_by, approved_by, status,
                approval_comment, created_at, updated_at, is_mock
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                report.id,
                report.project_id,
                report.week,
                report.rag_status.as_str(),
                report.accomplishments,
                report.next_week_plan,
                report.risks_mitigation,
                report.blockers,
                report.prepared_by,
                report.approved_by,
                report.status.as_str(),
                report.approval_comment,
                report.created_at,
                report.updated_at,
                report.is_mock as i64,
            ],
        )?;
        Ok(())
    }

    pub fn get_all_reports(&self) -> Result<Vec<DbWeeklyReport>, DbError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {REPORT_COLUMNS} FROM weekly_reports"))?;
        let rows = stmt.query_map([], Self::map_report_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// The "current" report for a (project, week) pair: first match in
    /// insertion order. The store does not enforce uniqueness; two rows for
    /// the same pair can coexist if inserted directly.
    pub fn find_report(
        &self,
        project_id: &str,
        week: &str,
    ) -> Result<Option<DbWeeklyReport>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REPORT_COLUMNS} FROM weekly_reports
             WHERE project_id = ?1 AND week = ?2 LIMIT 1"
        ))?;
        let mut rows = stmt.query_map(params![project_id, week], Self::map_report_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }
}
