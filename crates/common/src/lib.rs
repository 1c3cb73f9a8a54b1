//! Masdar Common Library
//!
//! Shared code for the Masdar services including:
//! - Database models and the passage store
//! - The citation retrieval and grounded-synthesis engine
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{PassageStore, PgPassageStore};
pub use engine::{AgentResponse, Citation, CitationAgent, DISCLAIMER};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
