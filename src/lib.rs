// Café site - JSON file store, CRUD API and client controllers

pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod documents;
pub mod error;
pub mod models;
pub mod store;

// Re-exports for convenience
pub use error::{AppError, AppResult};
