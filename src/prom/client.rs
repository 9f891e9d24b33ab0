//! Prometheus HTTP API Client
//!
//! HTTP client for the `query_range` endpoint of a Prometheus-compatible
//! backend. The rest of the crate depends only on the narrow
//! [`MetricsBackend`] capability, so tests (and alternative transports) can
//! substitute their own implementation.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigError, ConfigProvider};
use crate::prom::model::{Matrix, Point, Series};
use crate::query::QueryRange;

/// Result of one range query: the matrix plus any non-fatal warnings
#[derive(Debug, Clone, Default)]
pub struct RangeResult {
    pub matrix: Matrix,
    pub warnings: Vec<String>,
}

/// Capability to execute a range query against the metrics backend
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    async fn query_range(&self, query: &str, range: &QueryRange)
        -> Result<RangeResult, ClientError>;
}

/// Production backend over the Prometheus HTTP API.
///
/// The endpoint and request timeout come from the injected provider and are
/// read fresh on every query, matching the rest of the crate's
/// reload-per-request configuration policy.
pub struct PromClient {
    http: reqwest::Client,
    config: Arc<dyn ConfigProvider>,
}

impl PromClient {
    /// Create a new client over the given configuration provider
    pub fn new(config: Arc<dyn ConfigProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl MetricsBackend for PromClient {
    async fn query_range(
        &self,
        query: &str,
        range: &QueryRange,
    ) -> Result<RangeResult, ClientError> {
        let cfg = self.config.load()?;
        let url = format!(
            "{}/api/v1/query_range",
            cfg.endpoint.trim_end_matches('/')
        );

        let response = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .query(&[
                ("query", query.to_string()),
                ("start", range.from.timestamp().to_string()),
                ("end", range.to.timestamp().to_string()),
                ("step", format!("{}s", range.step.num_seconds())),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout
                } else if e.is_connect() {
                    ClientError::Unavailable
                } else {
                    ClientError::Request(e)
                }
            })?;

        let status = response.status();
        let body: ApiResponse = response.json().await.map_err(|e| {
            ClientError::BadResponse(format!("undecodable response body: {e}"))
        })?;

        if body.status != "success" {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: match body.error_type {
                    Some(kind) => format!("{kind}: {}", body.error.unwrap_or_default()),
                    None => body.error.unwrap_or_else(|| "unknown error".to_string()),
                },
            });
        }

        let data = body
            .data
            .ok_or_else(|| ClientError::BadResponse("success response without data".to_string()))?;
        if data.result_type != "matrix" {
            return Err(ClientError::BadResponse(format!(
                "expected matrix result, got {:?}",
                data.result_type
            )));
        }

        let mut matrix = Matrix::with_capacity(data.result.len());
        for raw in data.result {
            matrix.push(convert_series(raw)?);
        }

        Ok(RangeResult {
            matrix,
            warnings: body.warnings,
        })
    }
}

fn convert_series(raw: RawSeries) -> Result<Series, ClientError> {
    let mut points = Vec::with_capacity(raw.values.len());
    for (epoch, value) in raw.values {
        points.push(Point {
            timestamp: convert_timestamp(epoch)?,
            value: parse_sample_value(&value)?,
        });
    }
    Ok(Series {
        labels: raw.metric,
        points,
    })
}

fn convert_timestamp(epoch_secs: f64) -> Result<DateTime<Utc>, ClientError> {
    Utc.timestamp_millis_opt((epoch_secs * 1000.0).round() as i64)
        .single()
        .ok_or_else(|| {
            ClientError::BadResponse(format!("timestamp {epoch_secs} out of range"))
        })
}

/// Sample values arrive as strings; Prometheus spells the specials as
/// `NaN`, `+Inf` and `-Inf`.
fn parse_sample_value(raw: &str) -> Result<f64, ClientError> {
    match raw {
        "+Inf" => Ok(f64::INFINITY),
        "-Inf" => Ok(f64::NEG_INFINITY),
        _ => raw.parse::<f64>().map_err(|_| {
            ClientError::BadResponse(format!("unparseable sample value {raw:?}"))
        }),
    }
}

// ============================================
// Response DTOs
// ============================================

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    data: Option<ApiData>,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(rename = "errorType", default)]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    #[serde(rename = "resultType")]
    result_type: String,
    #[serde(default)]
    result: Vec<RawSeries>,
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    metric: BTreeMap<String, String>,
    #[serde(default)]
    values: Vec<(f64, String)>,
}

// ============================================
// Errors
// ============================================

/// Errors that can occur when talking to the metrics backend
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("backend unavailable")]
    Unavailable,

    #[error("request timeout")]
    Timeout,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected backend response: {0}")]
    BadResponse(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
