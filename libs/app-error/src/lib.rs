use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Internal(#[from] anyhow::Error),

  #[error("Malformed payload:{0}")]
  MalformedPayload(String),

  #[error("Record not found:{0}")]
  RecordNotFound(String),

  #[error("Invalid request:{0}")]
  InvalidRequest(String),

  #[error("Invalid property:{0}")]
  InvalidProperty(String),

  /// Wiring error: the deployment references something this server does not know about.
  #[error("Configuration error:{0}")]
  Configuration(String),

  #[cfg(feature = "sqlx_error")]
  #[error("{0}")]
  SqlxError(String),
}

impl AppError {
  pub fn is_configuration(&self) -> bool {
    matches!(self, AppError::Configuration(_))
  }

  pub fn code(&self) -> ErrorCode {
    match self {
      AppError::Internal(_) => ErrorCode::Internal,
      AppError::MalformedPayload(_) => ErrorCode::MalformedPayload,
      AppError::RecordNotFound(_) => ErrorCode::RecordNotFound,
      AppError::InvalidRequest(_) => ErrorCode::InvalidRequest,
      AppError::InvalidProperty(_) => ErrorCode::InvalidProperty,
      AppError::Configuration(_) => ErrorCode::Configuration,
      #[cfg(feature = "sqlx_error")]
      AppError::SqlxError(_) => ErrorCode::SqlxError,
    }
  }
}

#[cfg(feature = "sqlx_error")]
impl From<sqlx::Error> for AppError {
  fn from(value: sqlx::Error) -> Self {
    let msg = value.to_string();
    match value {
      sqlx::Error::RowNotFound => {
        AppError::RecordNotFound(format!("Record not exist in db. {})", msg))
      },
      _ => AppError::SqlxError(msg),
    }
  }
}

#[derive(
  Eq, PartialEq, Copy, Debug, Clone, serde_repr::Serialize_repr, serde_repr::Deserialize_repr,
)]
#[repr(i32)]
pub enum ErrorCode {
  RecordNotFound = -2,
  MalformedPayload = 1001,
  InvalidRequest = 1008,
  Internal = 1017,
  #[cfg(feature = "sqlx_error")]
  SqlxError = 1020,
  InvalidProperty = 1030,
  Configuration = 1031,
}

#[derive(Serialize)]
struct AppErrorSerde {
  code: ErrorCode,
  message: String,
}

impl From<&AppError> for AppErrorSerde {
  fn from(value: &AppError) -> Self {
    Self {
      code: value.code(),
      message: value.to_string(),
    }
  }
}

#[cfg(feature = "actix_web_error")]
impl actix_web::error::ResponseError for AppError {
  fn status_code(&self) -> actix_web::http::StatusCode {
    use actix_web::http::StatusCode;
    match self {
      AppError::RecordNotFound(_) => StatusCode::NOT_FOUND,
      AppError::InvalidRequest(_) | AppError::InvalidProperty(_) => StatusCode::BAD_REQUEST,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> actix_web::HttpResponse {
    actix_web::HttpResponse::build(self.status_code()).json(AppErrorSerde::from(self))
  }
}
