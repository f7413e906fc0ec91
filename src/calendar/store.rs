//! Commitment storage trait and the embedded in-memory implementation.
//!
//! The store is the engine's single source of busy time. Besides plain CRUD
//! it provides the batched overlap query availability filtering runs once per
//! window, and the atomic [`CommitmentStore::reserve`] that bookings go
//! through.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex as AsyncMutex, RwLock};

use crate::calendar::types::Commitment;
use crate::error::{BookingError, RendezError, Result, StorageError};

// ============================================================================
// CommitmentStore Trait
// ============================================================================

/// Trait for commitment storage backends.
#[async_trait]
pub trait CommitmentStore: Send + Sync {
    /// Record a commitment.
    async fn create(&self, commitment: Commitment) -> Result<Commitment>;

    /// Get a commitment by ID.
    async fn get(&self, id: &str) -> Result<Option<Commitment>>;

    /// Remove a commitment by ID.
    async fn remove(&self, id: &str) -> Result<bool>;

    /// Find every commitment that keeps one of `calendar_ids` busy inside
    /// `[start, end)`: the identity attends with a non-declined state and the
    /// commitment conflicts with the window. Results are sorted by start.
    async fn find_overlapping(
        &self,
        calendar_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Commitment>>;

    /// Atomically re-check availability and record `commitment`.
    ///
    /// The conflict check and the insert run under a single writer section,
    /// so two concurrent reservations touching the same calendar identity and
    /// window cannot both succeed. Fails with [`BookingError::SlotTaken`]
    /// when any non-declined attendee already has a conflicting commitment.
    async fn reserve(&self, commitment: Commitment) -> Result<Commitment>;

    /// Number of stored commitments.
    async fn count(&self) -> Result<usize>;

    /// Clear all data from the store.
    async fn clear(&self) -> Result<()>;
}

// ============================================================================
// Internal Data Structure
// ============================================================================

/// Internal data storage structure.
#[derive(Debug, Default)]
struct CommitmentData {
    /// Commitments indexed by ID.
    commitments: HashMap<String, Commitment>,
    /// Index: calendar identity -> commitment IDs (any attendance state).
    by_calendar: HashMap<String, Vec<String>>,
}

impl CommitmentData {
    /// Add a commitment to the calendar-identity index.
    fn index_attendees(&mut self, commitment: &Commitment) {
        for attendee in &commitment.attendees {
            self.by_calendar
                .entry(attendee.calendar_id.clone())
                .or_default()
                .push(commitment.id.clone());
        }
    }

    /// Remove a commitment from the calendar-identity index.
    fn unindex_attendees(&mut self, commitment: &Commitment) {
        for attendee in &commitment.attendees {
            if let Some(ids) = self.by_calendar.get_mut(&attendee.calendar_id) {
                ids.retain(|id| id != &commitment.id);
            }
        }
    }

    /// First commitment keeping `calendar_id` busy inside `[start, stop)`.
    fn conflicting(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
    ) -> Option<&Commitment> {
        let ids = self.by_calendar.get(calendar_id)?;
        ids.iter()
            .filter_map(|id| self.commitments.get(id))
            .find(|c| c.blocks(calendar_id) && c.conflicts_with(start, stop))
    }
}

/// Serialized snapshot format.
#[derive(Serialize, Deserialize)]
struct PersistenceData {
    version: u32,
    commitments: Vec<Commitment>,
}

// ============================================================================
// Embedded Implementation
// ============================================================================

/// In-memory commitment store with optional persistence.
///
/// Commitments live in HashMaps behind a single RwLock; a secondary index by
/// calendar identity keeps overlap queries from scanning the whole table.
#[derive(Debug)]
pub struct InMemoryCommitmentStore {
    /// All data protected by a single RwLock for consistent access.
    data: RwLock<CommitmentData>,
    /// Optional persistence file path.
    persistence_path: Option<std::path::PathBuf>,
    /// Mutex for persistence operations.
    persist_lock: AsyncMutex<()>,
}

impl InMemoryCommitmentStore {
    /// Create a new in-memory store without persistence.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(CommitmentData::default()),
            persistence_path: None,
            persist_lock: AsyncMutex::new(()),
        }
    }

    /// Create a store persisting to `commitments.json` under `data_dir`.
    pub async fn with_persistence(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).map_err(StorageError::Io)?;

        let persistence_path = data_dir.join("commitments.json");
        let store = Self {
            data: RwLock::new(CommitmentData::default()),
            persistence_path: Some(persistence_path.clone()),
            persist_lock: AsyncMutex::new(()),
        };

        // Load existing data if present
        if persistence_path.exists() {
            store.load_from_file(&persistence_path).await?;
        }

        Ok(store)
    }

    /// Load data from a JSON snapshot.
    async fn load_from_file(&self, path: &Path) -> Result<()> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(RendezError::Io)?;

        let persisted: PersistenceData = serde_json::from_str(&content).map_err(|e| {
            StorageError::CorruptedSnapshot(format!("{}: {}", path.display(), e))
        })?;

        let mut data = self.data.write().await;
        for commitment in persisted.commitments {
            data.index_attendees(&commitment);
            data.commitments.insert(commitment.id.clone(), commitment);
        }

        tracing::info!(
            "Loaded {} commitments from {}",
            data.commitments.len(),
            path.display()
        );

        Ok(())
    }

    /// Persist data to file if persistence is enabled.
    async fn persist(&self) -> Result<()> {
        let Some(ref path) = self.persistence_path else {
            return Ok(());
        };

        let _lock = self.persist_lock.lock().await;

        let data = self.data.read().await;
        let commitments: Vec<Commitment> = data.commitments.values().cloned().collect();
        drop(data);

        let persisted = PersistenceData {
            version: 1,
            commitments,
        };

        let content =
            serde_json::to_string_pretty(&persisted).map_err(RendezError::Serialization)?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(RendezError::Io)?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(RendezError::Io)?;

        Ok(())
    }
}

impl Default for InMemoryCommitmentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommitmentStore for InMemoryCommitmentStore {
    async fn create(&self, commitment: Commitment) -> Result<Commitment> {
        let mut data = self.data.write().await;

        data.index_attendees(&commitment);
        data.commitments
            .insert(commitment.id.clone(), commitment.clone());

        drop(data);
        self.persist().await?;
        Ok(commitment)
    }

    async fn get(&self, id: &str) -> Result<Option<Commitment>> {
        let data = self.data.read().await;
        Ok(data.commitments.get(id).cloned())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let mut data = self.data.write().await;

        let commitment = match data.commitments.remove(id) {
            Some(c) => c,
            None => return Ok(false),
        };
        data.unindex_attendees(&commitment);

        drop(data);
        self.persist().await?;
        Ok(true)
    }

    async fn find_overlapping(
        &self,
        calendar_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Commitment>> {
        let data = self.data.read().await;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut results: Vec<Commitment> = Vec::new();

        for calendar_id in calendar_ids {
            let Some(ids) = data.by_calendar.get(calendar_id) else {
                continue;
            };
            for id in ids {
                if seen.contains(id.as_str()) {
                    continue;
                }
                let Some(commitment) = data.commitments.get(id) else {
                    continue;
                };
                if commitment.blocks(calendar_id) && commitment.conflicts_with(start, end) {
                    seen.insert(id.as_str());
                    results.push(commitment.clone());
                }
            }
        }

        results.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        Ok(results)
    }

    async fn reserve(&self, commitment: Commitment) -> Result<Commitment> {
        let mut data = self.data.write().await;

        // Re-validate every busy attendee before inserting. Holding the
        // writer lock across check and insert is what makes concurrent
        // reservations mutually exclusive.
        for attendee in &commitment.attendees {
            if attendee.status == crate::calendar::types::AttendeeStatus::Declined {
                continue;
            }
            if data
                .conflicting(&attendee.calendar_id, commitment.start, commitment.stop)
                .is_some()
            {
                return Err(BookingError::SlotTaken {
                    calendar_id: attendee.calendar_id.clone(),
                    start: commitment.start,
                    stop: commitment.stop,
                }
                .into());
            }
        }

        data.index_attendees(&commitment);
        data.commitments
            .insert(commitment.id.clone(), commitment.clone());

        drop(data);
        self.persist().await?;

        tracing::debug!("Reserved commitment {} ({})", commitment.id, commitment.title);
        Ok(commitment)
    }

    async fn count(&self) -> Result<usize> {
        let data = self.data.read().await;
        Ok(data.commitments.len())
    }

    async fn clear(&self) -> Result<()> {
        let mut data = self.data.write().await;
        data.commitments.clear();
        data.by_calendar.clear();

        drop(data);
        self.persist().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn ts(d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, d, h, mi, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_overlapping() {
        let store = InMemoryCommitmentStore::new();
        store
            .create(Commitment::new("Standup", ts(7, 10, 0), ts(7, 10, 30)).with_attendee("cal-a"))
            .await
            .unwrap();
        store
            .create(Commitment::new("Review", ts(8, 14, 0), ts(8, 15, 0)).with_attendee("cal-a"))
            .await
            .unwrap();

        let found = store
            .find_overlapping(&["cal-a".to_string()], ts(7, 0, 0), ts(8, 0, 0))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Standup");
    }

    #[tokio::test]
    async fn test_find_overlapping_skips_declined() {
        let store = InMemoryCommitmentStore::new();
        store
            .create(
                Commitment::new("Optional sync", ts(7, 10, 0), ts(7, 11, 0)).with_attendee_status(
                    "cal-a",
                    crate::calendar::types::AttendeeStatus::Declined,
                ),
            )
            .await
            .unwrap();

        let found = store
            .find_overlapping(&["cal-a".to_string()], ts(7, 0, 0), ts(8, 0, 0))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_find_overlapping_deduplicates_shared_events() {
        let store = InMemoryCommitmentStore::new();
        store
            .create(
                Commitment::new("Planning", ts(7, 9, 0), ts(7, 10, 0))
                    .with_attendee("cal-a")
                    .with_attendee("cal-b"),
            )
            .await
            .unwrap();

        let found = store
            .find_overlapping(
                &["cal-a".to_string(), "cal-b".to_string()],
                ts(7, 0, 0),
                ts(8, 0, 0),
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_reserve_rejects_conflict() {
        let store = InMemoryCommitmentStore::new();
        store
            .reserve(Commitment::new("First", ts(7, 10, 0), ts(7, 11, 0)).with_attendee("cal-a"))
            .await
            .unwrap();

        let second = store
            .reserve(Commitment::new("Second", ts(7, 10, 30), ts(7, 11, 30)).with_attendee("cal-a"))
            .await;
        assert!(matches!(
            second,
            Err(RendezError::Booking(BookingError::SlotTaken { .. }))
        ));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reserve_allows_touching_intervals() {
        let store = InMemoryCommitmentStore::new();
        store
            .reserve(Commitment::new("First", ts(7, 10, 0), ts(7, 11, 0)).with_attendee("cal-a"))
            .await
            .unwrap();
        store
            .reserve(Commitment::new("Second", ts(7, 11, 0), ts(7, 12, 0)).with_attendee("cal-a"))
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_reserve_single_winner() {
        let store = Arc::new(InMemoryCommitmentStore::new());

        let a = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .reserve(
                        Commitment::new("Visitor A", ts(7, 10, 0), ts(7, 11, 0))
                            .with_attendee("cal-a"),
                    )
                    .await
            })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .reserve(
                        Commitment::new("Visitor B", ts(7, 10, 0), ts(7, 11, 0))
                            .with_attendee("cal-a"),
                    )
                    .await
            })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_unindexes() {
        let store = InMemoryCommitmentStore::new();
        let c = store
            .create(Commitment::new("Standup", ts(7, 10, 0), ts(7, 10, 30)).with_attendee("cal-a"))
            .await
            .unwrap();

        assert!(store.remove(&c.id).await.unwrap());
        assert!(!store.remove(&c.id).await.unwrap());

        let found = store
            .find_overlapping(&["cal-a".to_string()], ts(7, 0, 0), ts(8, 0, 0))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_corrupted_snapshot_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("commitments.json"), "not json")
            .await
            .unwrap();

        let err = InMemoryCommitmentStore::with_persistence(dir.path())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RendezError::Storage(StorageError::CorruptedSnapshot(_))
        ));
    }

    #[tokio::test]
    async fn test_persistence_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();

        {
            let store = InMemoryCommitmentStore::with_persistence(dir.path())
                .await
                .unwrap();
            store
                .create(
                    Commitment::new("Standup", ts(7, 10, 0), ts(7, 10, 30)).with_attendee("cal-a"),
                )
                .await
                .unwrap();
        }

        let reopened = InMemoryCommitmentStore::with_persistence(dir.path())
            .await
            .unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);

        let found = reopened
            .find_overlapping(&["cal-a".to_string()], ts(7, 0, 0), ts(8, 0, 0))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Standup");
    }
}
