//! Query error types
//!
//! Defines all error conditions that can occur while translating and
//! executing a tabular metrics query.

use thiserror::Error;

use crate::config::ConfigError;
use crate::prom::client::ClientError;

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// Configuration unreadable or malformed
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Required input missing or malformed; raised before any backend call
    #[error("Invalid query: {0}")]
    Validation(String),

    /// Alias template failed to parse or render
    #[error("Could not render query: {0}")]
    Template(String),

    /// The backend range query failed
    #[error("Could not execute query: {0}")]
    Backend(#[from] ClientError),

    /// Alias table lookup miss
    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    /// Intentional capability gap, never degraded into a substitute query
    #[error("Not supported: {0}")]
    Unsupported(&'static str),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
