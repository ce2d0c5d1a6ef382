use app_error::AppError;

/// Table and column names are spliced into SQL text, so only plain identifiers are accepted.
pub fn validate_identifier(ident: &str) -> Result<(), AppError> {
  let mut chars = ident.chars();
  let valid_head = chars
    .next()
    .map(|c| c.is_ascii_alphabetic() || c == '_')
    .unwrap_or(false);
  if valid_head && ident.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
    Ok(())
  } else {
    Err(AppError::Configuration(format!(
      "'{}' is not a valid sql identifier",
      ident
    )))
  }
}

pub fn quote_identifier(ident: &str) -> String {
  format!("\"{}\"", ident)
}
