use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

#[cfg(test)]
use std::collections::HashSet;

use super::{MoodStore, StoreResult};
#[cfg(test)]
use super::StoreError;
use crate::models::mood_entry::{EntryId, MetricsPatch, MoodEntry, MoodMetrics};

/// In-process store for local runs and tests. Ids are assigned sequentially
/// like a serial column.
#[derive(Default)]
pub struct MemoryMoodStore {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    last_id: EntryId,
    rows: Vec<MoodEntry>,
    #[cfg(test)]
    failing_updates: HashSet<EntryId>,
    #[cfg(test)]
    unavailable: bool,
    #[cfg(test)]
    update_calls: Vec<(EntryId, MetricsPatch)>,
}

impl MemoryMoodStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryMoodStore {
    /// Seeds rows as they would already exist in the store.
    pub fn with_entries(entries: Vec<MoodEntry>) -> Self {
        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);
        Self {
            inner: Mutex::new(MemoryState {
                last_id,
                rows: entries,
                ..MemoryState::default()
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    pub async fn get(&self, id: EntryId) -> Option<MoodEntry> {
        self.inner
            .lock()
            .await
            .rows
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    pub async fn fail_updates_for(&self, id: EntryId) {
        self.inner.lock().await.failing_updates.insert(id);
    }

    pub async fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().await.unavailable = unavailable;
    }

    pub async fn update_calls(&self) -> Vec<(EntryId, MetricsPatch)> {
        self.inner.lock().await.update_calls.clone()
    }
}

impl MemoryState {
    fn check_available(&self) -> StoreResult<()> {
        #[cfg(test)]
        if self.unavailable {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MoodStore for MemoryMoodStore {
    async fn insert(&self, metrics: &MoodMetrics, created_at: DateTime<Utc>) -> StoreResult<MoodEntry> {
        let mut state = self.inner.lock().await;
        state.check_available()?;

        state.last_id += 1;
        let entry = MoodEntry {
            id: state.last_id,
            created_at,
            metrics: *metrics,
        };
        state.rows.push(entry.clone());
        Ok(entry)
    }

    async fn update(&self, id: EntryId, patch: &MetricsPatch) -> StoreResult<Option<MoodEntry>> {
        let mut state = self.inner.lock().await;
        state.check_available()?;

        #[cfg(test)]
        {
            state.update_calls.push((id, patch.clone()));
            if state.failing_updates.contains(&id) {
                return Err(StoreError::Remote {
                    status: 500,
                    body: format!("update of row {} rejected", id),
                });
            }
        }

        let Some(row) = state.rows.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        patch.apply_to(&mut row.metrics);
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: EntryId) -> StoreResult<Option<MoodEntry>> {
        let mut state = self.inner.lock().await;
        state.check_available()?;

        let Some(pos) = state.rows.iter().position(|e| e.id == id) else {
            return Ok(None);
        };
        Ok(Some(state.rows.remove(pos)))
    }

    async fn list_desc(&self) -> StoreResult<Vec<MoodEntry>> {
        let state = self.inner.lock().await;
        state.check_available()?;

        let mut rows = state.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<MoodEntry>> {
        let state = self.inner.lock().await;
        state.check_available()?;

        let mut rows: Vec<MoodEntry> = state
            .rows
            .iter()
            .filter(|e| e.created_at >= start && e.created_at < end)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.inner.lock().await.check_available()
    }
}
