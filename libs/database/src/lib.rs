pub mod content;
pub mod entity;
pub mod identifier;
pub mod install;
pub mod memory;

pub type DatabaseResult<T, E = app_error::AppError> = core::result::Result<T, E>;
