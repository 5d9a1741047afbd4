//! Shared application state for the HTTP layer.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::config;
use crate::db::DashboardDb;
use crate::error::ApiError;

/// State shared across request handlers.
///
/// One mutex-guarded connection: the backend processes one request at a
/// time against the store. Concurrent edits from two clients to the same
/// row are last-write-wins; there is no version field and no locking
/// beyond this mutex.
pub struct AppState {
    db: Mutex<DashboardDb>,
    confluence_config_path: PathBuf,
    ai_config_path: PathBuf,
}

impl AppState {
    pub fn new(db: DashboardDb) -> Self {
        Self {
            db: Mutex::new(db),
            confluence_config_path: config::confluence_config_path(),
            ai_config_path: config::ai_config_path(),
        }
    }

    /// Override the config file locations. Useful for testing.
    pub fn with_config_paths(mut self, confluence: PathBuf, ai: PathBuf) -> Self {
        self.confluence_config_path = confluence;
        self.ai_config_path = ai;
        self
    }

    pub fn db(&self) -> Result<MutexGuard<'_, DashboardDb>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Store("Lock poisoned".to_string()))
    }

    pub fn confluence_config(&self) -> Result<config::ConfluenceConfig, ApiError> {
        Ok(config::load_confluence_config(&self.confluence_config_path)?)
    }

    pub fn ai_config(&self) -> Result<config::AiConfig, ApiError> {
        Ok(config::load_ai_config(&self.ai_config_path)?)
    }
}
