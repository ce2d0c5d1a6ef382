use crate::identifier::{quote_identifier, validate_identifier};
use crate::DatabaseResult;
use app_error::AppError;
use async_trait::async_trait;
use database_entity::dto::ContentKey;
use sqlx::{Executor, PgPool, Postgres};
use tracing::trace;

/// Storage of simple content slots keyed by [ContentKey].
///
/// A save must be an atomic single-row upsert: concurrent requests may write the same slot.
#[async_trait]
pub trait ContentStore: Send + Sync + 'static {
  async fn save(&self, key: &ContentKey, content: &str) -> DatabaseResult<()>;

  /// Returns `None` when the slot was never saved.
  async fn get(&self, key: &ContentKey) -> DatabaseResult<Option<String>>;
}

pub struct PgContentStore {
  pg_pool: PgPool,
  table: String,
}

impl PgContentStore {
  pub fn new(pg_pool: PgPool, table_name: &str) -> Result<Self, AppError> {
    validate_identifier(table_name)?;
    Ok(Self {
      pg_pool,
      table: quote_identifier(table_name),
    })
  }
}

#[async_trait]
impl ContentStore for PgContentStore {
  async fn save(&self, key: &ContentKey, content: &str) -> DatabaseResult<()> {
    upsert_inline_content(&self.pg_pool, &self.table, key, content).await
  }

  async fn get(&self, key: &ContentKey) -> DatabaseResult<Option<String>> {
    select_inline_content(&self.pg_pool, &self.table, key).await
  }
}

/// `table` must already be a quoted identifier.
pub async fn upsert_inline_content<'a, E: Executor<'a, Database = Postgres>>(
  executor: E,
  table: &str,
  key: &ContentKey,
  content: &str,
) -> Result<(), AppError> {
  let sql = format!(
    r#"
      INSERT INTO {} (namespace, locale, name, content) VALUES ($1, $2, $3, $4)
      ON CONFLICT (namespace, locale, name) DO UPDATE SET content = EXCLUDED.content
    "#,
    table
  );
  sqlx::query(sql.as_str())
    .bind(&key.namespace)
    .bind(&key.locale)
    .bind(&key.name)
    .bind(content)
    .execute(executor)
    .await?;
  trace!("upsert inline content: {}", key);
  Ok(())
}

/// `table` must already be a quoted identifier.
pub async fn select_inline_content<'a, E: Executor<'a, Database = Postgres>>(
  executor: E,
  table: &str,
  key: &ContentKey,
) -> Result<Option<String>, AppError> {
  let sql = format!(
    "SELECT content FROM {} WHERE namespace = $1 AND locale = $2 AND name = $3",
    table
  );
  let content = sqlx::query_scalar::<_, String>(sql.as_str())
    .bind(&key.namespace)
    .bind(&key.locale)
    .bind(&key.name)
    .fetch_optional(executor)
    .await?;
  Ok(content)
}
