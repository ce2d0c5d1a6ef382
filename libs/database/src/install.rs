use crate::identifier::{quote_identifier, validate_identifier};
use app_error::AppError;
use sqlx::PgPool;
use tracing::info;

pub fn create_inline_content_table_sql(table_name: &str) -> Result<String, AppError> {
  validate_identifier(table_name)?;
  let table = quote_identifier(table_name);
  let unique = quote_identifier(&format!("{}_unique", table_name));
  Ok(format!(
    r#"
      CREATE TABLE IF NOT EXISTS {table} (
        id SERIAL PRIMARY KEY,
        namespace VARCHAR(255) NOT NULL,
        locale VARCHAR(16) NOT NULL,
        name VARCHAR(255) NOT NULL,
        content TEXT NOT NULL,
        CONSTRAINT {unique} UNIQUE (namespace, locale, name)
      )
    "#
  ))
}

/// Create the content table if it does not exist yet.
pub async fn create_inline_content_table(pool: &PgPool, table_name: &str) -> Result<(), AppError> {
  let sql = create_inline_content_table_sql(table_name)?;
  sqlx::query(sql.as_str()).execute(pool).await?;
  info!("inline content table {} is ready", table_name);
  Ok(())
}
