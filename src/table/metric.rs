//! Metric table
//!
//! `promql_metric` is the query orchestrator: it resolves each requested
//! name to a PromQL template, renders it, runs one range query per name over
//! the resolved interval, and streams the flattened rows to the caller.
//!
//! # Request Pipeline
//!
//! ```text
//! quals → names + filter + range → resolve alias → render → query_range
//!       → relabel + flatten → sink
//! ```
//!
//! Aliases are processed sequentially in input order; all rows of one alias
//! are emitted before the next alias's query starts. The first failing alias
//! aborts the whole request.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::ConfigProvider;
use crate::prom::client::MetricsBackend;
use crate::prom::model::{flatten, Sample};
use crate::query::{
    alias_names, label_filter, standard_params, AliasRegistry, Qual, QueryError, QueryRange,
    QueryResult, QueryTemplate,
};
use crate::table::{ColumnDef, ColumnType, RowSink, TableDef};

const METRIC_TABLE: TableDef = TableDef {
    name: "promql_metric",
    description: "Executes PromQL queries defined in the alias table. Queries are summarized so that about 1000 data points come back regardless of the requested range.",
    columns: &[
        ColumnDef {
            name: "name",
            column_type: ColumnType::String,
            description: "The metric name used to trigger the aliased query.",
        },
        ColumnDef {
            name: "labels",
            column_type: ColumnType::Json,
            description: "Map of all labels in the metric.",
        },
        ColumnDef {
            name: "timestamp",
            column_type: ColumnType::Timestamp,
            description: "Timestamp of the value.",
        },
        ColumnDef {
            name: "value",
            column_type: ColumnType::Double,
            description: "Value of the metric.",
        },
    ],
};

/// The `promql_metric` table
pub struct MetricTable {
    config: Arc<dyn ConfigProvider>,
    backend: Arc<dyn MetricsBackend>,
}

impl MetricTable {
    pub fn new(config: Arc<dyn ConfigProvider>, backend: Arc<dyn MetricsBackend>) -> Self {
        Self { config, backend }
    }

    pub fn def() -> &'static TableDef {
        &METRIC_TABLE
    }

    /// Run one tabular query and stream its rows.
    ///
    /// Validation (names present, label operator supported, range complete)
    /// happens before any backend call. Backend warnings are logged, never
    /// surfaced as rows or errors. A closed sink ends the request cleanly:
    /// the caller hung up, there is nobody left to report to.
    pub async fn list(&self, quals: &[Qual], sink: &mut dyn RowSink<Sample>) -> QueryResult<()> {
        let names = alias_names(quals)?;
        let filter = label_filter(quals)?;
        let range = QueryRange::from_quals(quals)?;

        let config = self.config.load()?;
        let registry = AliasRegistry::from_config(&config);
        let params = standard_params(&filter);

        for name in &names {
            let resolution = registry.resolve(name);
            let query = QueryTemplate::parse(resolution.template())?.render(&params)?;
            tracing::debug!(
                alias = %name,
                registered = resolution.is_registered(),
                query = %query,
                from = %range.from,
                to = %range.to,
                step_secs = range.step.num_seconds(),
                "executing range query"
            );

            let result = self.backend.query_range(&query, &range).await?;
            for warning in &result.warnings {
                tracing::warn!(alias = %name, warning = %warning, "backend warning");
            }

            let mut rows = 0usize;
            for series in result.matrix {
                for sample in flatten(name, series) {
                    if sink.stream_row(sample).await.is_err() {
                        tracing::debug!(alias = %name, "row sink closed, stopping request");
                        return Ok(());
                    }
                    rows += 1;
                }
            }
            tracing::debug!(alias = %name, rows, "alias complete");
        }

        Ok(())
    }

    /// Point lookup by (name, timestamp).
    ///
    /// Intentionally unsupported: a single-point answer synthesized from a
    /// one-bucket range query would not be the sample the caller asked for.
    pub async fn get(&self, _name: &str, _timestamp: DateTime<Utc>) -> QueryResult<Sample> {
        Err(QueryError::Unsupported(
            "get is not implemented for promql_metric",
        ))
    }
}
