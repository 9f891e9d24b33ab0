//! Alias table
//!
//! `promql_alias` projects the configured alias definitions as rows, one per
//! (name, template) pair. Unlike the metric table's resolution fallback, a
//! get of an unknown name here is a real miss: the table lists configuration,
//! it does not synthesize it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ConfigProvider;
use crate::query::{QueryError, QueryResult};
use crate::table::{ColumnDef, ColumnType, RowSink, TableDef};

/// One alias row: a named PromQL query template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    pub template: String,
}

const ALIAS_TABLE: TableDef = TableDef {
    name: "promql_alias",
    description: "Aliases are templates for PromQL queries that are projected as metric names.",
    columns: &[
        ColumnDef {
            name: "name",
            column_type: ColumnType::String,
            description: "The name of the query alias.",
        },
        ColumnDef {
            name: "template",
            column_type: ColumnType::String,
            description: "A query template rendered into PromQL at query time.",
        },
    ],
};

/// The `promql_alias` table
pub struct AliasTable {
    config: Arc<dyn ConfigProvider>,
}

impl AliasTable {
    pub fn new(config: Arc<dyn ConfigProvider>) -> Self {
        Self { config }
    }

    pub fn def() -> &'static TableDef {
        &ALIAS_TABLE
    }

    /// Stream all configured aliases, sorted by name
    pub async fn list(&self, sink: &mut dyn RowSink<Alias>) -> QueryResult<()> {
        let config = self.config.load()?;
        for (name, template) in &config.aliases {
            let row = Alias {
                name: name.clone(),
                template: template.clone(),
            };
            if sink.stream_row(row).await.is_err() {
                tracing::debug!("row sink closed, stopping alias listing");
                return Ok(());
            }
        }
        Ok(())
    }

    /// Look up one alias by exact name
    pub async fn get(&self, name: &str) -> QueryResult<Alias> {
        let config = self.config.load()?;
        match config.aliases.get(name) {
            Some(template) => Ok(Alias {
                name: name.to_string(),
                template: template.clone(),
            }),
            None => Err(QueryError::AliasNotFound(name.to_string())),
        }
    }
}
