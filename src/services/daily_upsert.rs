//! Day-bucketed save: at most one entry per UTC calendar day.
//!
//! The lookup and the following insert/update are two separate store calls,
//! so two concurrent writers can both miss today's entry and both insert.
//! The service is single-user and accepts that race.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use validator::Validate;

use crate::error::AppResult;
use crate::models::mood_entry::{MetricsPatch, MoodEntry, MoodMetrics};
use crate::store::{MoodStore, StoreError};

#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub entry: MoodEntry,
    /// `true` when this save created today's entry.
    pub created: bool,
}

/// `[start of day, start of next day)` in UTC.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
    (start, start + Duration::days(1))
}

pub async fn save_today(
    store: &dyn MoodStore,
    metrics: MoodMetrics,
    now: DateTime<Utc>,
) -> AppResult<SaveOutcome> {
    metrics.validate()?;

    let (start, end) = day_bounds(now.date_naive());
    let matches = store.find_in_range(start, end).await.map_err(|e| {
        tracing::error!(error = %e, day = %start.date_naive(), "Lookup of today's entry failed");
        e
    })?;

    if matches.len() > 1 {
        tracing::warn!(
            day = %start.date_naive(),
            count = matches.len(),
            "Multiple entries found for one day; updating the oldest"
        );
    }

    match matches.into_iter().next() {
        Some(existing) => {
            let updated = store
                .update(existing.id, &MetricsPatch::from(metrics))
                .await?
                .ok_or_else(|| {
                    StoreError::Decode(format!("entry {} vanished during update", existing.id))
                })?;
            tracing::info!(entry_id = updated.id, "Updated today's entry");
            Ok(SaveOutcome {
                entry: updated,
                created: false,
            })
        }
        None => {
            let entry = store.insert(&metrics, now).await?;
            tracing::info!(entry_id = entry.id, "Created today's entry");
            Ok(SaveOutcome {
                entry,
                created: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::store::MemoryMoodStore;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn metrics(anger: i32) -> MoodMetrics {
        MoodMetrics {
            anger,
            ..MoodMetrics::default()
        }
    }

    #[test]
    fn test_day_bounds_cover_whole_day() {
        let (start, end) = day_bounds(NaiveDate::from_ymd_opt(2026, 2, 10).unwrap());
        assert_eq!(start, at("2026-02-10T00:00:00Z"));
        assert_eq!(end, at("2026-02-11T00:00:00Z"));
    }

    #[tokio::test]
    async fn test_same_day_save_updates_in_place() {
        let store = MemoryMoodStore::new();
        let first = save_today(&store, metrics(1), at("2026-02-10T08:00:00Z"))
            .await
            .unwrap();
        let second = save_today(&store, metrics(5), at("2026-02-10T21:30:00Z"))
            .await
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(store.len().await, 1);
        assert_eq!(second.entry.id, first.entry.id);
        assert_eq!(second.entry.metrics.anger, 5);
        assert_eq!(second.entry.created_at, at("2026-02-10T08:00:00Z"));
    }

    #[tokio::test]
    async fn test_next_day_creates_new_entry() {
        let store = MemoryMoodStore::new();
        let d = save_today(&store, metrics(1), at("2026-02-10T08:00:00Z"))
            .await
            .unwrap();
        let d1 = save_today(&store, metrics(2), at("2026-02-11T08:00:00Z"))
            .await
            .unwrap();

        assert!(d1.created);
        assert_ne!(d.entry.id, d1.entry.id);
        assert_eq!(store.len().await, 2);
        assert_eq!(d.entry.created_at, at("2026-02-10T08:00:00Z"));
        assert_eq!(d1.entry.created_at, at("2026-02-11T08:00:00Z"));
    }

    #[tokio::test]
    async fn test_last_second_of_day_is_matched() {
        let store = MemoryMoodStore::new();
        save_today(&store, metrics(1), at("2026-02-10T23:59:59Z"))
            .await
            .unwrap();
        let again = save_today(&store, metrics(2), at("2026-02-10T23:59:59.500Z"))
            .await
            .unwrap();

        assert!(!again.created);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_midnight_belongs_to_new_day() {
        let store = MemoryMoodStore::new();
        save_today(&store, metrics(1), at("2026-02-10T23:59:59Z"))
            .await
            .unwrap();
        let next = save_today(&store, metrics(2), at("2026-02-11T00:00:00Z"))
            .await
            .unwrap();

        assert!(next.created);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_day_rows_update_oldest() {
        let older = MoodEntry {
            id: 10,
            created_at: at("2026-02-10T07:00:00Z"),
            metrics: metrics(0),
        };
        let newer = MoodEntry {
            id: 11,
            created_at: at("2026-02-10T09:00:00Z"),
            metrics: metrics(0),
        };
        let store = MemoryMoodStore::with_entries(vec![newer, older]);

        let outcome = save_today(&store, metrics(8), at("2026-02-10T12:00:00Z"))
            .await
            .unwrap();

        assert_eq!(outcome.entry.id, 10);
        assert_eq!(store.get(11).await.unwrap().metrics.anger, 0);
    }

    #[tokio::test]
    async fn test_negative_metric_rejected_before_store_call() {
        let store = MemoryMoodStore::new();
        let result = save_today(&store, metrics(-2), at("2026-02-10T08:00:00Z")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let store = MemoryMoodStore::new();
        store.set_unavailable(true).await;
        let result = save_today(&store, metrics(1), at("2026-02-10T08:00:00Z")).await;
        assert!(matches!(result, Err(AppError::Store(_))));
    }
}
