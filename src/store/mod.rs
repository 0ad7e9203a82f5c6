//! Record store client: a thin pass-through over the table that owns all
//! mood entries. No retries, no transactions, no caching. Every backend
//! converts its native failure into [`StoreError`] at the call site.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::{Config, StoreBackend};
use crate::models::mood_entry::{EntryId, MetricsPatch, MoodEntry, MoodMetrics};

pub mod memory;
pub mod postgres;
pub mod rest;

pub use memory::MemoryMoodStore;
pub use postgres::PgMoodStore;
pub use rest::RestMoodStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store responded {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("unexpected store response: {0}")]
    Decode(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait MoodStore: Send + Sync {
    /// Inserts one row and returns it with its store-assigned id.
    async fn insert(&self, metrics: &MoodMetrics, created_at: DateTime<Utc>) -> StoreResult<MoodEntry>;

    /// Writes only the fields present in `patch`. `None` when no row has `id`.
    async fn update(&self, id: EntryId, patch: &MetricsPatch) -> StoreResult<Option<MoodEntry>>;

    /// Returns the removed row, or `None` when nothing matched.
    async fn delete(&self, id: EntryId) -> StoreResult<Option<MoodEntry>>;

    /// All rows, newest `created_at` first.
    async fn list_desc(&self) -> StoreResult<Vec<MoodEntry>>;

    /// Rows with `start <= created_at < end`, oldest first (ties by id).
    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<MoodEntry>>;

    async fn ping(&self) -> StoreResult<()>;
}

/// Builds the process-wide store handle for the configured backend.
pub async fn connect(config: &Config) -> anyhow::Result<Arc<dyn MoodStore>> {
    match &config.store {
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = crate::db::create_pool(database_url, *max_connections)?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");
            Ok(Arc::new(PgMoodStore::new(pool)))
        }
        StoreBackend::Rest {
            url,
            api_key,
            schema,
            timeout_secs,
        } => {
            let store = RestMoodStore::new(url, api_key, schema, *timeout_secs)?;
            tracing::info!(url = %url, schema = %schema, "Using hosted REST store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; entries are lost on restart");
            Ok(Arc::new(MemoryMoodStore::new()))
        }
    }
}
