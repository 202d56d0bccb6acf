use crate::i18n::LanguageCode;
use crate::translation::{
    truncate_chars, ContentType, RemoteCache, RemoteCacheRow, StoreOutcome, SOURCE_TEXT_MAX_CHARS,
};
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS translation_cache (
        id BIGSERIAL PRIMARY KEY,
        source_text TEXT NOT NULL,
        source_language TEXT NOT NULL,
        target_language TEXT NOT NULL,
        translation_type TEXT NOT NULL,
        translated_text TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (source_text, source_language, target_language, translation_type)
    )";

const SELECT_TRANSLATION: &str = "
    SELECT translated_text
    FROM translation_cache
    WHERE source_text = $1
      AND source_language = $2
      AND target_language = $3
      AND translation_type = $4
    LIMIT 1";

const INSERT_TRANSLATION: &str = "
    INSERT INTO translation_cache
        (source_text, source_language, target_language, translation_type, translated_text)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (source_text, source_language, target_language, translation_type) DO NOTHING";

/// PostgreSQL-backed shared translation cache.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and make sure the cache table exists
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        let db = Self { pool };
        db.ensure_schema().await?;
        info!("✓ Remote translation cache ready");
        Ok(db)
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .context("Failed to create translation_cache table")?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_translation(
        &self,
        source_text: &str,
        from: &LanguageCode,
        to: &LanguageCode,
        content_type: ContentType,
    ) -> Result<Option<String>> {
        let source_text = truncate_chars(source_text, SOURCE_TEXT_MAX_CHARS);
        let row: Option<(String,)> = sqlx::query_as(SELECT_TRANSLATION)
            .bind(&source_text)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(content_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query translation_cache")?;

        Ok(row.map(|(translated,)| translated))
    }

    /// Insert a row unless one exists for the same key. Existing rows are
    /// never overwritten.
    pub async fn insert_translation(&self, row: &RemoteCacheRow) -> Result<StoreOutcome> {
        let result = sqlx::query(INSERT_TRANSLATION)
            .bind(&row.source_text)
            .bind(row.source_language.as_str())
            .bind(row.target_language.as_str())
            .bind(row.translation_type.as_str())
            .bind(&row.translated_text)
            .execute(&self.pool)
            .await
            .context("Failed to insert into translation_cache")?;

        Ok(if result.rows_affected() == 0 {
            StoreOutcome::AlreadyPresent
        } else {
            StoreOutcome::Inserted
        })
    }

    pub async fn count_translations(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM translation_cache")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count translation_cache rows")?;
        Ok(count)
    }
}

/// Open the remote cache if one is configured. A connection failure is
/// logged and the chain runs without the remote tier.
pub async fn connect_remote_cache(database_url: Option<&str>) -> Option<Arc<dyn RemoteCache>> {
    let url = database_url?;
    match Database::connect(url).await {
        Ok(db) => Some(Arc::new(db)),
        Err(e) => {
            warn!("Remote translation cache unavailable: {:#}", e);
            None
        }
    }
}

impl RemoteCache for Database {
    fn lookup<'a>(
        &'a self,
        source_text: &'a str,
        from: &'a LanguageCode,
        to: &'a LanguageCode,
        content_type: ContentType,
    ) -> BoxFuture<'a, Result<Option<String>>> {
        self.find_translation(source_text, from, to, content_type)
            .boxed()
    }

    fn store(&self, row: RemoteCacheRow) -> BoxFuture<'_, Result<StoreOutcome>> {
        async move { self.insert_translation(&row).await }.boxed()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("connections", &self.pool.size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// These tests need a scratch PostgreSQL; they are skipped unless
    /// TEST_DATABASE_URL is set.
    async fn test_db() -> Option<Database> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let db = Database::connect(&url).await.expect("connect to test database");
        sqlx::query("TRUNCATE translation_cache")
            .execute(db.pool())
            .await
            .expect("truncate");
        Some(db)
    }

    #[tokio::test]
    async fn test_no_database_url_means_no_remote_tier() {
        assert!(connect_remote_cache(None).await.is_none());
    }

    #[test]
    fn test_queries_share_the_unique_key() {
        let key = "source_text, source_language, target_language, translation_type";
        assert!(CREATE_TABLE.contains(&format!("UNIQUE ({})", key)));
        assert!(INSERT_TRANSLATION.contains(&format!("ON CONFLICT ({}) DO NOTHING", key)));
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_store_then_lookup() {
        let Some(db) = test_db().await else { return };
        let row = RemoteCacheRow::new("Hello", &"en".into(), &"es".into(), ContentType::News, "Hola");

        assert_eq!(db.store(row.clone()).await.unwrap(), StoreOutcome::Inserted);
        let found = db
            .lookup("Hello", &"en".into(), &"es".into(), ContentType::News)
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some("Hola"));

        // Different content type is a different key
        let other = db
            .lookup("Hello", &"en".into(), &"es".into(), ContentType::Chat)
            .await
            .unwrap();
        assert_eq!(other, None);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_existing_row_is_not_overwritten() {
        let Some(db) = test_db().await else { return };
        let first = RemoteCacheRow::new("Hello", &"en".into(), &"fr".into(), ContentType::Ui, "Bonjour");
        let second = RemoteCacheRow::new("Hello", &"en".into(), &"fr".into(), ContentType::Ui, "Salut");

        assert_eq!(db.store(first).await.unwrap(), StoreOutcome::Inserted);
        assert_eq!(db.store(second).await.unwrap(), StoreOutcome::AlreadyPresent);

        let found = db
            .lookup("Hello", &"en".into(), &"fr".into(), ContentType::Ui)
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some("Bonjour"));
        assert_eq!(db.count_translations().await.unwrap(), 1);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_long_source_matches_on_truncated_prefix() {
        let Some(db) = test_db().await else { return };
        let long = "a".repeat(SOURCE_TEXT_MAX_CHARS + 10);
        let row = RemoteCacheRow::new(&long, &"en".into(), &"de".into(), ContentType::News, "lang");

        db.store(row).await.unwrap();
        let found = db
            .lookup(&long, &"en".into(), &"de".into(), ContentType::News)
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some("lang"));
    }
}
