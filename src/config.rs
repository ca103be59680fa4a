use std::{env, path::PathBuf, time::Duration};

/// Default outbound request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30000;

/// Default header carrying the authenticated owner id.
pub const DEFAULT_OWNER_HEADER: &str = "x-user-id";

/// Which history backend to construct at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sqlite(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub storage: StorageBackend,
    pub proxy_timeout: Duration,
    pub owner_header: String,
}

impl Config {
    pub fn from_env() -> Self {
        let database_path = env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("api-playground.db"));

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            storage: parse_backend(env::var("HISTORY_BACKEND").ok().as_deref(), database_path),
            proxy_timeout: Duration::from_millis(
                env::var("PROXY_TIMEOUT_MS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_MS),
            ),
            owner_header: env::var("OWNER_HEADER")
                .ok()
                .filter(|h| !h.trim().is_empty())
                .map(|h| h.to_ascii_lowercase())
                .unwrap_or_else(|| DEFAULT_OWNER_HEADER.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            storage: StorageBackend::Memory,
            proxy_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            owner_header: DEFAULT_OWNER_HEADER.to_string(),
        }
    }
}

fn parse_backend(value: Option<&str>, database_path: PathBuf) -> StorageBackend {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("sqlite") => StorageBackend::Sqlite(database_path),
        Some("memory") | None => StorageBackend::Memory,
        Some(other) => {
            tracing::warn!(backend = other, "Unknown HISTORY_BACKEND, using in-memory history");
            StorageBackend::Memory
        }
    }
}
