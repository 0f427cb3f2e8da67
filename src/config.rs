use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string, e.g. "sqlite:./snaplink.db".
    ///
    /// The schema puts a UNIQUE index on `url`, so a database that already
    /// holds the same original URL twice fails schema setup at startup.
    pub database_url: String,

    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Size of the SQLite connection pool. Always 1 for in-memory databases,
    /// where every connection would otherwise see its own empty database.
    pub max_connections: u32,

    /// Directory whose contents are served under `/UI/`
    pub ui_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = var("PORT")
            .unwrap_or_else(|| "5500".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let database_url = var("DATABASE_URL").unwrap_or_else(|| "sqlite:./snaplink.db".into());

        let mut max_connections = var("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(10);

        if is_in_memory(&database_url) && max_connections != 1 {
            tracing::warn!(
                "DATABASE_URL is in-memory; using 1 connection instead of {}",
                max_connections
            );
            max_connections = 1;
        }

        Ok(Self {
            database_url,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            max_connections,
            ui_dir: var("UI_DIR").unwrap_or_else(|| "./UI".into()).into(),
        })
    }

    /// `host:port` string handed to the TCP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
