use std::env;

use anyhow::{bail, Context};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub store: StoreBackend,

    /// Shared secret checked by the access gate. Empty when unconfigured.
    pub access_password: String,
    pub session_secret: String,
}

#[derive(Debug, Clone)]
pub enum StoreBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Rest {
        url: String,
        api_key: String,
        schema: String,
        timeout_secs: u64,
    },
    Memory,
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Postgres { .. } => "postgres",
            StoreBackend::Rest { .. } => "rest",
            StoreBackend::Memory => "memory",
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .unwrap_or_else(|| default.into())
        .parse()
        .with_context(|| format!("{} must be a number", key))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|s| !s.is_empty());

        let backend = match var("STORE_BACKEND") {
            Some(name) => name.to_lowercase(),
            None if var("DATABASE_URL").is_some() => "postgres".into(),
            None if var("SUPABASE_URL").is_some() => "rest".into(),
            None => "memory".into(),
        };

        let store = match backend.as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: var("DATABASE_URL")
                    .context("DATABASE_URL must be set for the postgres backend")?,
                max_connections: parse_var(&var, "DATABASE_MAX_CONNECTIONS", "5")?,
            },
            "rest" => StoreBackend::Rest {
                url: var("SUPABASE_URL").context("SUPABASE_URL must be set for the rest backend")?,
                api_key: var("SUPABASE_KEY").context("SUPABASE_KEY must be set for the rest backend")?,
                schema: var("STORE_SCHEMA").unwrap_or_else(|| "moodlogs".into()),
                timeout_secs: parse_var(&var, "STORE_TIMEOUT_SECS", "30")?,
            },
            "memory" => StoreBackend::Memory,
            other => bail!("STORE_BACKEND must be postgres, rest or memory (got {})", other),
        };

        let session_secret = match (var("SESSION_SECRET"), &store) {
            (Some(secret), _) => secret,
            (None, StoreBackend::Memory) => uuid::Uuid::new_v4().to_string(),
            (None, _) => bail!("SESSION_SECRET must be set"),
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_var(&var, "PORT", "8080")?,
            frontend_url: var("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".into()),
            store,
            access_password: var("ACCESS_PASSWORD").unwrap_or_default(),
            session_secret,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(access_password: &str) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            store: StoreBackend::Memory,
            access_password: access_password.into(),
            session_secret: "test-session-secret".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_database_url_selects_postgres() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/moodlog"),
            ("SUPABASE_URL", "https://abc.example.co"),
            ("SESSION_SECRET", "s3cret"),
        ])
        .unwrap();
        match config.store {
            StoreBackend::Postgres {
                database_url,
                max_connections,
            } => {
                assert_eq!(database_url, "postgres://localhost/moodlog");
                assert_eq!(max_connections, 5);
            }
            other => panic!("expected postgres, got {}", other.name()),
        }
    }

    #[test]
    fn test_supabase_url_selects_rest() {
        let config = load(&[
            ("SUPABASE_URL", "https://abc.example.co"),
            ("SUPABASE_KEY", "anon-key"),
            ("SESSION_SECRET", "s3cret"),
        ])
        .unwrap();
        match config.store {
            StoreBackend::Rest {
                url,
                api_key,
                schema,
                timeout_secs,
            } => {
                assert_eq!(url, "https://abc.example.co");
                assert_eq!(api_key, "anon-key");
                assert_eq!(schema, "moodlogs");
                assert_eq!(timeout_secs, 30);
            }
            other => panic!("expected rest, got {}", other.name()),
        }
    }

    #[test]
    fn test_no_store_vars_selects_memory() {
        let config = load(&[]).unwrap();
        assert_eq!(config.store.name(), "memory");
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
        assert_eq!(config.access_password, "");
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = load(&[("DATABASE_URL", ""), ("PORT", "")]).unwrap();
        assert_eq!(config.store.name(), "memory");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_session_secret_required_outside_memory() {
        let err = load(&[("DATABASE_URL", "postgres://localhost/moodlog")]).unwrap_err();
        assert!(err.to_string().contains("SESSION_SECRET"));

        let err = load(&[
            ("SUPABASE_URL", "https://abc.example.co"),
            ("SUPABASE_KEY", "anon-key"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("SESSION_SECRET"));
    }

    #[test]
    fn test_memory_gets_random_session_secret() {
        let a = load(&[]).unwrap();
        let b = load(&[]).unwrap();
        assert!(!a.session_secret.is_empty());
        assert_ne!(a.session_secret, b.session_secret);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = load(&[("STORE_BACKEND", "sqlite"), ("SESSION_SECRET", "s3cret")]).unwrap_err();
        assert!(err.to_string().contains("STORE_BACKEND"));
    }

    #[test]
    fn test_explicit_backend_needs_its_url() {
        let err = load(&[("STORE_BACKEND", "Rest"), ("SESSION_SECRET", "s3cret")]).unwrap_err();
        assert!(err.to_string().contains("SUPABASE_URL"));
    }

    #[test]
    fn test_bad_port_rejected() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
