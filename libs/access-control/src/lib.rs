pub mod checker;
pub mod context;
pub mod handler;
pub mod role;
