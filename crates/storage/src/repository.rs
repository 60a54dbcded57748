//! Repository Implementation

use crate::record::LifetimeRecord;
use crate::StorageError;
use serde::{Deserialize, Serialize};
use session::SessionSummary;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Serializable copy of the whole repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub sessions: Vec<SessionSummary>,
    pub records: Vec<LifetimeRecord>,
}

/// Session summaries plus per-user lifetime records (in-memory)
pub struct SessionRepository {
    /// Summaries in insertion order
    sessions: Mutex<VecDeque<SessionSummary>>,
    /// Lifetime records keyed by user id
    records: Mutex<HashMap<String, LifetimeRecord>>,
    /// Oldest summaries are dropped past this count
    max_sessions: usize,
}

impl SessionRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        info!("Creating in-memory session repository");
        Self {
            sessions: Mutex::new(VecDeque::with_capacity(256)),
            records: Mutex::new(HashMap::new()),
            max_sessions: 100_000,
        }
    }

    /// Store a finished session. Sessions with a user id also update that
    /// user's lifetime record.
    pub fn insert_session(&self, summary: SessionSummary) -> Result<Uuid, StorageError> {
        if let Some(user_id) = &summary.user_id {
            let mut records = self
                .records
                .lock()
                .map_err(|e| StorageError::Lock(e.to_string()))?;
            records
                .entry(user_id.clone())
                .or_insert_with(|| LifetimeRecord::new(user_id.clone(), summary.username.clone()))
                .add_session(&summary);
        }

        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        // Enforce retention
        while sessions.len() >= self.max_sessions {
            sessions.pop_front();
        }

        let id = summary.session_id;
        sessions.push_back(summary);
        debug!("Stored session {}", id);
        Ok(id)
    }

    pub fn get_session(&self, id: Uuid) -> Result<SessionSummary, StorageError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        sessions
            .iter()
            .find(|s| s.session_id == id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    pub fn sessions_for_user(&self, user_id: &str) -> Result<Vec<SessionSummary>, StorageError> {
        self.filter_sessions(|s| s.user_id.as_deref() == Some(user_id))
    }

    pub fn sessions_for_username(&self, username: &str) -> Result<Vec<SessionSummary>, StorageError> {
        self.filter_sessions(|s| s.username.as_deref() == Some(username))
    }

    /// Sessions with `start_date <= date <= end_date` (`YYYY-MM-DD`), oldest first
    pub fn sessions_in_range(
        &self,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<SessionSummary>, StorageError> {
        let mut found = self.filter_sessions(|s| {
            s.user_id.as_deref() == Some(user_id)
                && s.date.as_str() >= start_date
                && s.date.as_str() <= end_date
        })?;
        found.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(found)
    }

    /// Most recent sessions first, by date then start time
    pub fn recent_sessions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SessionSummary>, StorageError> {
        let mut found = self.sessions_for_user(user_id)?;
        found.sort_by(|a, b| {
            (b.date.as_str(), b.time_started.as_str()).cmp(&(a.date.as_str(), a.time_started.as_str()))
        });
        found.truncate(limit);
        Ok(found)
    }

    pub fn lifetime_record(&self, user_id: &str) -> Result<Option<LifetimeRecord>, StorageError> {
        let records = self
            .records
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(records.get(user_id).cloned())
    }

    /// Get total session count
    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn snapshot(&self) -> Result<RepositorySnapshot, StorageError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        let records = self
            .records
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        let mut records: Vec<_> = records.values().cloned().collect();
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(RepositorySnapshot {
            sessions: sessions.iter().cloned().collect(),
            records,
        })
    }

    pub fn from_snapshot(snapshot: RepositorySnapshot) -> Self {
        let repo = Self::new();
        info!(
            "Restoring {} sessions and {} lifetime records",
            snapshot.sessions.len(),
            snapshot.records.len()
        );
        if let Ok(mut sessions) = repo.sessions.lock() {
            sessions.extend(snapshot.sessions);
        }
        if let Ok(mut records) = repo.records.lock() {
            records.extend(snapshot.records.into_iter().map(|r| (r.user_id.clone(), r)));
        }
        repo
    }

    /// Encode the repository with postcard
    pub fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        postcard::to_allocvec(&self.snapshot()?)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let snapshot: RepositorySnapshot = postcard::from_bytes(bytes)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let bytes = self.to_bytes()?;
        tokio::fs::write(path.as_ref(), &bytes).await?;
        debug!("Wrote {} byte snapshot to {}", bytes.len(), path.as_ref().display());
        Ok(())
    }

    /// Load a snapshot; a missing file yields an empty repository
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        match tokio::fs::read(path.as_ref()).await {
            Ok(bytes) => Self::from_bytes(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Clear all data (for testing)
    fn filter_sessions(
        &self,
        keep: impl Fn(&SessionSummary) -> bool,
    ) -> Result<Vec<SessionSummary>, StorageError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(sessions.iter().filter(|s| keep(s)).cloned().collect())
    }
}

impl Default for SessionRepository {
    fn default() -> Self {
        Self::new()
    }
}
