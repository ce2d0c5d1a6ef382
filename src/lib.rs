pub mod api;
pub mod application;
pub mod biz;
pub mod component;
pub mod config;
pub mod middleware;
pub mod state;
pub mod telemetry;
