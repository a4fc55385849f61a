//! Library catalog server
//!
//! A REST JSON API over a small library catalog: books, authors, genres,
//! languages, publishers and the borrowable copies of each book, with loan
//! renewal and a capability-based access policy.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
