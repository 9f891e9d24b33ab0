//! Tabular surface
//!
//! The tables promtab projects into the host query engine:
//!
//! - [`metric`]: `promql_metric`, the range-query orchestrator
//! - [`alias`]: `promql_alias`, the configured alias listing
//!
//! Tables describe themselves through [`TableDef`]/[`ColumnDef`] and emit
//! rows one at a time through a caller-supplied [`RowSink`], so a result set
//! is never buffered whole.

pub mod alias;
pub mod metric;

pub use alias::{Alias, AliasTable};
pub use metric::MetricTable;

use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;

/// Column type as seen by the host engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Json,
    Timestamp,
    Double,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "string"),
            ColumnType::Json => write!(f, "json"),
            ColumnType::Timestamp => write!(f, "timestamp"),
            ColumnType::Double => write!(f, "double"),
        }
    }
}

/// One column declaration
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub description: &'static str,
}

/// One table declaration
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub description: &'static str,
    pub columns: &'static [ColumnDef],
}

/// Error returned when the receiving end of a sink has gone away
#[derive(Debug, thiserror::Error)]
#[error("row sink closed")]
pub struct SinkClosed;

/// Caller-supplied row consumer.
///
/// A closed sink means the caller hung up (dropped its receiver); tables
/// treat that as cancellation and stop all further work for the request.
#[async_trait]
pub trait RowSink<R: Send + 'static>: Send {
    async fn stream_row(&mut self, row: R) -> Result<(), SinkClosed>;
}

/// Channel-backed sink: rows flow to the receiver as they are produced
#[async_trait]
impl<R: Send + 'static> RowSink<R> for mpsc::Sender<R> {
    async fn stream_row(&mut self, row: R) -> Result<(), SinkClosed> {
        self.send(row).await.map_err(|_| SinkClosed)
    }
}

/// Collecting sink, for tests and small embedded uses
#[async_trait]
impl<R: Send + 'static> RowSink<R> for Vec<R> {
    async fn stream_row(&mut self, row: R) -> Result<(), SinkClosed> {
        self.push(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_vec_sink_collects() {
        let mut sink: Vec<u32> = Vec::new();
        sink.stream_row(1).await.unwrap();
        sink.stream_row(2).await.unwrap();
        assert_eq!(sink, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_channel_sink_streams() {
        let (mut tx, mut rx) = mpsc::channel::<u32>(4);
        tx.stream_row(7).await.unwrap();
        assert_eq!(rx.recv().await, Some(7));
    }

    #[tokio::test]
    async fn test_channel_sink_reports_closed() {
        let (mut tx, rx) = mpsc::channel::<u32>(4);
        drop(rx);
        assert!(tx.stream_row(7).await.is_err());
    }
}
