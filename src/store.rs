use crate::{config::AppConfig, models::UrlPair};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database could not be reached or the statement failed.
    #[error("storage unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// An insert was rejected by one of the `UNIQUE` indexes.
    #[error("uniqueness violation inserting alias '{0}'")]
    UniquenessViolation(String),

    #[error("schema initialisation failed: {0}")]
    Schema(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}

/// Durable two-way mapping between original URLs and aliases.
///
/// Lookups are exact string matches; no URL normalisation happens here.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Create the backing table and indexes if absent. Safe to call on every start.
    async fn ensure_schema(&self) -> Result<()>;

    /// Alias already assigned to `original`, if any.
    async fn find_by_original(&self, original: &str) -> Result<Option<String>>;

    /// Whether any pair uses `alias`.
    async fn exists_alias(&self, alias: &str) -> Result<bool>;

    /// Original URL behind `alias`, if any.
    async fn find_by_alias(&self, alias: &str) -> Result<Option<String>>;

    /// Add a new pair. Does not pre-check uniqueness; a rejected insert comes
    /// back as `StoreError::UniquenessViolation`.
    async fn insert(&self, pair: &UrlPair) -> Result<()>;
}

/// `Store` backed by a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the pool described by `config`, creating the database file if it
    /// doesn't exist yet.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let options = config
            .database_url
            .parse::<SqliteConnectOptions>()?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for checked-out connections to be returned, then close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn find_by_original(&self, original: &str) -> Result<Option<String>> {
        let alias: Option<String> =
            sqlx::query_scalar("SELECT s_url FROM url_pairs WHERE url = ?1 LIMIT 1")
                .bind(original)
                .fetch_optional(&self.pool)
                .await?;

        Ok(alias)
    }

    async fn exists_alias(&self, alias: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM url_pairs WHERE s_url = ?1)")
                .bind(alias)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<String>> {
        let url: Option<String> =
            sqlx::query_scalar("SELECT url FROM url_pairs WHERE s_url = ?1 LIMIT 1")
                .bind(alias)
                .fetch_optional(&self.pool)
                .await?;

        Ok(url)
    }

    async fn insert(&self, pair: &UrlPair) -> Result<()> {
        let result = sqlx::query("INSERT INTO url_pairs (url, s_url) VALUES (?1, ?2)")
            .bind(&pair.url)
            .bind(&pair.s_url)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::UniquenessViolation(pair.s_url.clone()))
            }
            Err(e) => Err(StoreError::Unavailable(e)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Single-connection in-memory store with the schema applied. One
    /// connection keeps every query on the same `:memory:` database.
    pub(crate) async fn memory_store() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteStore::new(pool);
        store.ensure_schema().await.unwrap();
        store
    }

    async fn all_pairs(store: &SqliteStore) -> Vec<UrlPair> {
        sqlx::query_as("SELECT url, s_url FROM url_pairs ORDER BY rowid")
            .fetch_all(store.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let store = memory_store().await;
        store
            .insert(&UrlPair::new("https://example.com", "abc1234"))
            .await
            .unwrap();

        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();

        assert_eq!(
            all_pairs(&store).await,
            vec![UrlPair::new("https://example.com", "abc1234")]
        );
    }

    #[tokio::test]
    async fn insert_then_lookup_both_directions() {
        let store = memory_store().await;
        store
            .insert(&UrlPair::new("https://example.com/page", "Xy7pQ2z"))
            .await
            .unwrap();

        assert_eq!(
            store
                .find_by_original("https://example.com/page")
                .await
                .unwrap()
                .as_deref(),
            Some("Xy7pQ2z")
        );
        assert_eq!(
            store.find_by_alias("Xy7pQ2z").await.unwrap().as_deref(),
            Some("https://example.com/page")
        );
        assert!(store.exists_alias("Xy7pQ2z").await.unwrap());
    }

    #[tokio::test]
    async fn lookups_on_empty_store_are_not_found() {
        let store = memory_store().await;

        assert!(store.find_by_alias("doesnotexist").await.unwrap().is_none());
        assert!(store.find_by_alias("").await.unwrap().is_none());
        assert!(store
            .find_by_original("https://example.com")
            .await
            .unwrap()
            .is_none());
        assert!(!store.exists_alias("abc1234").await.unwrap());
    }

    #[tokio::test]
    async fn lookups_are_exact_matches() {
        let store = memory_store().await;
        store
            .insert(&UrlPair::new("https://example.com/page", "abcDEF1"))
            .await
            .unwrap();

        assert!(store
            .find_by_original("https://example.com/page/")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_original("HTTPS://EXAMPLE.COM/page")
            .await
            .unwrap()
            .is_none());
        assert!(store.find_by_alias("abcdef1").await.unwrap().is_none());
        assert!(!store.exists_alias("abcDEF").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_alias_is_a_uniqueness_violation() {
        let store = memory_store().await;
        store
            .insert(&UrlPair::new("https://one.example", "same123"))
            .await
            .unwrap();

        let err = store
            .insert(&UrlPair::new("https://two.example", "same123"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::UniquenessViolation(ref a) if a == "same123"));
        assert_eq!(
            store.find_by_alias("same123").await.unwrap().as_deref(),
            Some("https://one.example")
        );
    }

    #[tokio::test]
    async fn duplicate_original_is_a_uniqueness_violation() {
        let store = memory_store().await;
        store
            .insert(&UrlPair::new("https://one.example", "first12"))
            .await
            .unwrap();

        let err = store
            .insert(&UrlPair::new("https://one.example", "second1"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::UniquenessViolation(_)));
        assert!(!store.exists_alias("second1").await.unwrap());
    }

    #[tokio::test]
    async fn closed_pool_surfaces_unavailable() {
        let store = memory_store().await;
        store.close().await;

        let err = store.find_by_alias("abc1234").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let err = store
            .insert(&UrlPair::new("https://example.com", "abc1234"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
