//! SQLite-backed store for the dashboard entities.
//!
//! The database lives at `~/.statusdeck/statusdeck.db` and is the single
//! source of truth; clients hold a read/write cache that is authoritative
//! only until the next successful fetch overwrites it. One connection,
//! guarded by the caller; the backend processes one request at a time.

use std::path::PathBuf;

use rusqlite::Connection;

pub mod types;
pub use types::*;

pub mod leave;
pub mod milestones;
pub mod projects;
pub mod reports;
pub mod risks;
pub mod seed;
pub mod sprints;
pub mod stories;
pub mod team;

pub use seed::SeedOutcome;
pub use stories::BulkInsert;

/// All eight entity collections, keyed by camelCase collection name on the
/// wire. This is both the `GET /api/data` response body and the client
/// cache's initial state.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSnapshot {
    pub projects: Vec<DbProject>,
    pub team_members: Vec<DbTeamMember>,
    pub stories: Vec<DbStory>,
    pub milestones: Vec<DbMilestone>,
    pub sprints: Vec<DbSprint>,
    pub risks: Vec<DbRisk>,
    pub leave_entries: Vec<DbLeaveEntry>,
    pub weekly_reports: Vec<DbWeeklyReport>,
}

pub struct DashboardDb {
    conn: Connection,
}

impl DashboardDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Self) -> Result<T, DbError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(val) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Open (or create) the database at `~/.statusdeck/statusdeck.db` and
    /// apply the schema.
    pub fn open() -> Result<Self, DbError> {
        let path = Self::db_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path. Useful for testing.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        Ok(Self { conn })
    }

    /// Load every collection in one pass.
    pub fn load_snapshot(&self) -> Result<DataSnapshot, DbError> {
        Ok(DataSnapshot {
            projects: self.get_all_projects()?,
            team_members: self.get_all_team_members()?,
            stories: self.get_all_stories()?,
            milestones: self.get_milestones(None)?,
            sprints: self.get_all_sprints()?,
            risks: self.get_all_risks()?,
            leave_entries: self.get_all_leave_entries()?,
            weekly_reports: self.get_all_reports()?,
        })
    }

    /// Resolve the default database path: `~/.statusdeck/statusdeck.db`.
    fn db_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".statusdeck").join("statusdeck.db"))
    }
}

// =============================================================================
// Shared test utilities
// =============================================================================


// =============================================================================
// Tests
// =============================================================================
