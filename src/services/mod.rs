pub mod analytics;
pub mod daily_upsert;
pub mod reconcile;
