use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{MoodStore, StoreResult};
use crate::models::mood_entry::{EntryId, MetricsPatch, MoodEntry, MoodMetrics};

/// Direct Postgres access to `moodlogs.mood_entries`.
#[derive(Clone)]
pub struct PgMoodStore {
    db: PgPool,
}

impl PgMoodStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MoodStore for PgMoodStore {
    async fn insert(&self, metrics: &MoodMetrics, created_at: DateTime<Utc>) -> StoreResult<MoodEntry> {
        let entry = sqlx::query_as::<_, MoodEntry>(
            r#"
            INSERT INTO moodlogs.mood_entries (
                created_at, loneliness, fulfillment, tiredness, energy_levels,
                excitement, sleepiness, anger, depression, mania, creativity,
                song_ideas, essay_ideas
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(created_at)
        .bind(metrics.loneliness)
        .bind(metrics.fulfillment)
        .bind(metrics.tiredness)
        .bind(metrics.energy_levels)
        .bind(metrics.excitement)
        .bind(metrics.sleepiness)
        .bind(metrics.anger)
        .bind(metrics.depression)
        .bind(metrics.mania)
        .bind(metrics.creativity)
        .bind(metrics.song_ideas)
        .bind(metrics.essay_ideas)
        .fetch_one(&self.db)
        .await?;

        Ok(entry)
    }

    async fn update(&self, id: EntryId, patch: &MetricsPatch) -> StoreResult<Option<MoodEntry>> {
        let entry = sqlx::query_as::<_, MoodEntry>(
            r#"
            UPDATE moodlogs.mood_entries SET
                loneliness = COALESCE($2, loneliness),
                fulfillment = COALESCE($3, fulfillment),
                tiredness = COALESCE($4, tiredness),
                energy_levels = COALESCE($5, energy_levels),
                excitement = COALESCE($6, excitement),
                sleepiness = COALESCE($7, sleepiness),
                anger = COALESCE($8, anger),
                depression = COALESCE($9, depression),
                mania = COALESCE($10, mania),
                creativity = COALESCE($11, creativity),
                song_ideas = COALESCE($12, song_ideas),
                essay_ideas = COALESCE($13, essay_ideas)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.loneliness)
        .bind(patch.fulfillment)
        .bind(patch.tiredness)
        .bind(patch.energy_levels)
        .bind(patch.excitement)
        .bind(patch.sleepiness)
        .bind(patch.anger)
        .bind(patch.depression)
        .bind(patch.mania)
        .bind(patch.creativity)
        .bind(patch.song_ideas)
        .bind(patch.essay_ideas)
        .fetch_optional(&self.db)
        .await?;

        Ok(entry)
    }

    async fn delete(&self, id: EntryId) -> StoreResult<Option<MoodEntry>> {
        let entry = sqlx::query_as::<_, MoodEntry>(
            "DELETE FROM moodlogs.mood_entries WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(entry)
    }

    async fn list_desc(&self) -> StoreResult<Vec<MoodEntry>> {
        let entries = sqlx::query_as::<_, MoodEntry>(
            "SELECT * FROM moodlogs.mood_entries ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<MoodEntry>> {
        let entries = sqlx::query_as::<_, MoodEntry>(
            r#"
            SELECT * FROM moodlogs.mood_entries
            WHERE created_at >= $1 AND created_at < $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.db)
            .await?;
        Ok(())
    }
}
