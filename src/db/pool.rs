use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Builds the shared pool without opening a connection. The first query
/// (normally the startup migration) establishes it.
pub fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy(database_url)
}
