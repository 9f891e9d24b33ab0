//! Core data types for range-query results
//!
//! A range query returns a *matrix*: a set of label-tagged series, each an
//! ordered sequence of (timestamp, value) points. The tabular surface wants
//! rows, so [`flatten`] turns one series into one [`Sample`] per point,
//! stamped with the alias that produced the query.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Reserved label carrying the metric name in Prometheus results
pub const NAME_LABEL: &str = "__name__";

/// One sampled point within a series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// One labeled value sequence returned by a range query
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Stable label set, including `__name__` as reported by the backend
    pub labels: BTreeMap<String, String>,
    /// Points in time-ascending order, as returned by the backend
    pub points: Vec<Point>,
}

/// The full result of one range query
pub type Matrix = Vec<Series>;

/// A single output row: one (series, timestamp) pair
///
/// `name` always carries the alias that produced the query, never the
/// backend's own `__name__` label, so several raw series can share one
/// semantic metric identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub name: String,
    /// Series labels, with the reserved name label excluded
    pub labels: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Flatten one series into rows, one per point.
///
/// The series' `__name__` label is dropped from the generic label map and the
/// alias takes its place as the row's first-class name. No aggregation,
/// deduplication, or gap-filling happens here; the query step already decided
/// the density.
pub fn flatten(alias: &str, series: Series) -> impl Iterator<Item = Sample> + '_ {
    let Series { mut labels, points } = series;
    labels.remove(NAME_LABEL);

    points.into_iter().map(move |point| Sample {
        name: alias.to_string(),
        labels: labels.clone(),
        timestamp: point.timestamp,
        value: point.value,
    })
}
