// LinkedIn Insights - company page scraping and query service

// Request primitives: pagination and filters
pub mod core;

// Storage: relational database and response cache
pub mod infrastructure;

// Rows and API views
pub mod models;

// Scraping, summaries and page orchestration
pub mod services;

// HTTP layer
pub mod app_state;
pub mod routes;

// Common utilities
pub mod config;
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
