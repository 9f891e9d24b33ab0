//! # Promtab
//!
//! Tabular access to Prometheus metrics: aliased PromQL range queries
//! flattened into row streams.
//!
//! ## Features
//!
//! - **Alias templates**: project reusable PromQL queries as plain metric
//!   names; unknown names degrade to pass-through selectors
//! - **Bounded results**: the sampling step is derived from the requested
//!   range so any span comes back as roughly 1000 points per series
//! - **Row streaming**: results flow through a sink one row at a time,
//!   never buffered whole
//! - **Live configuration**: endpoint and aliases are re-read per request
//!   through an injectable provider
//!
//! ## Modules
//!
//! - [`config`]: configuration file loading and the provider capability
//! - [`query`]: qualifier translation (aliases, time range, templates)
//! - [`prom`]: the metrics backend client and result model
//! - [`table`]: the `promql_metric` / `promql_alias` tabular surface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use promtab::config::FileConfigProvider;
//! use promtab::prom::PromClient;
//! use promtab::table::MetricTable;
//! use promtab::query::Qual;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(FileConfigProvider::default_location());
//!     let backend = Arc::new(PromClient::new(config.clone()));
//!     let table = MetricTable::new(config, backend);
//!
//!     // Query the last hour of `cpu_total` (alias or bare metric name)
//!     let quals = vec![Qual::equal("name", "cpu_total")];
//!     let mut rows: Vec<promtab::Sample> = Vec::new();
//!     table.list(&quals, &mut rows).await?;
//!
//!     println!("Got {} rows", rows.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod prom;
pub mod query;
pub mod table;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, ConfigProvider, FileConfigProvider, LoggingConfig};

pub use prom::{ClientError, Matrix, MetricsBackend, Point, PromClient, RangeResult, Sample, Series};

pub use query::{
    AliasRegistry, AliasResolution, Qual, QualOperator, QualValue, QueryError, QueryRange,
    QueryResult, QueryTemplate,
};

pub use table::{Alias, AliasTable, ColumnDef, ColumnType, MetricTable, RowSink, SinkClosed, TableDef};
