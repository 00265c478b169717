//! Abacaxi E-resources Metadata Hub
//!
//! Registers vendor packages of e-books and journals ("target services"),
//! imports their title lists from CSV files through a per-package column
//! mapping, and reconciles the imported records by ISBN.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod csv_conf;
pub mod error;
pub mod models;
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
