//! Time range resolution
//!
//! Turns timestamp qualifiers into a concrete `[from, to]` interval plus a
//! sampling step. The step is sized so that roughly 1000 points span the
//! range no matter how wide it is: a 30-day query over 15-second raw data
//! comes back at ~43-minute resolution instead of 170k rows.

use chrono::{DateTime, Duration, Utc};

use crate::query::error::{QueryError, QueryResult};
use crate::query::quals::{Qual, QualOperator, QualValue, COLUMN_TIMESTAMP};

/// A resolved query interval with its sampling step
///
/// Invariant: `from <= to` and `step >= 1s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub step: Duration,
}

impl QueryRange {
    /// Create a range over `[from, to]`, computing the step
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> QueryResult<Self> {
        if from > to {
            return Err(QueryError::Validation(format!(
                "starting timestamp {from} is after ending timestamp {to}"
            )));
        }
        Ok(Self {
            from,
            to,
            step: compute_step(from, to),
        })
    }

    /// The default range when the caller supplies no timestamp bounds
    pub fn last_hour() -> Self {
        let to = Utc::now();
        let from = to - Duration::hours(1);
        // from <= to holds by construction
        Self {
            from,
            to,
            step: compute_step(from, to),
        }
    }

    /// Resolve the range from the caller's timestamp qualifiers.
    ///
    /// `>`/`>=` set the lower bound and `<`/`<=` the upper; the
    /// inclusive/exclusive distinction is not preserved. With no bound on
    /// either side the range defaults to the last hour; a bound on only one
    /// side cannot be completed and fails.
    pub fn from_quals(quals: &[Qual]) -> QueryResult<Self> {
        let mut from = None;
        let mut to = None;

        for qual in quals.iter().filter(|q| q.column == COLUMN_TIMESTAMP) {
            let bound = match &qual.value {
                QualValue::Time(t) => *t,
                other => {
                    return Err(QueryError::Validation(format!(
                        "timestamp condition must be a timestamp, got {other:?}"
                    )))
                }
            };
            match qual.operator {
                QualOperator::GreaterThan | QualOperator::GreaterThanOrEqual => from = Some(bound),
                QualOperator::LessThan | QualOperator::LessThanOrEqual => to = Some(bound),
                _ => {}
            }
        }

        match (from, to) {
            (None, None) => Ok(Self::last_hour()),
            (Some(from), Some(to)) => Self::new(from, to),
            (None, Some(_)) => Err(QueryError::Validation(
                "starting timestamp must be specified".to_string(),
            )),
            (Some(_), None) => Err(QueryError::Validation(
                "ending timestamp must be specified".to_string(),
            )),
        }
    }

    /// Width of the interval
    pub fn span(&self) -> Duration {
        self.to - self.from
    }

    /// Number of step-spaced buckets in `[from, to]` inclusive
    pub fn bucket_count(&self) -> i64 {
        self.span().num_seconds() / self.step.num_seconds() + 1
    }
}

/// Step for ~1000 points across the span: one thousandth of the span plus
/// half a second, rounded to the nearest whole second, never below 1s.
fn compute_step(from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    let span_ms = (to - from).num_milliseconds();
    let step_ms = span_ms / 1000 + 500;
    let secs = ((step_ms + 500) / 1000).max(1);
    Duration::seconds(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_one_hour_step() {
        let range = QueryRange::new(ts(0), ts(3600)).unwrap();
        // 3.6s per bucket plus the half-second bias rounds to 4s
        assert_eq!(range.step, Duration::seconds(4));
    }

    #[test]
    fn test_thirty_day_step_keeps_point_count_bounded() {
        let range = QueryRange::new(ts(0), ts(30 * 24 * 3600)).unwrap();
        assert_eq!(range.step, Duration::seconds(2593));
        assert!((range.bucket_count() - 1000).abs() <= 1);
    }

    #[test]
    fn test_step_floor_is_one_second() {
        let range = QueryRange::new(ts(100), ts(100)).unwrap();
        assert_eq!(range.step, Duration::seconds(1));

        let range = QueryRange::new(ts(0), ts(1)).unwrap();
        assert_eq!(range.step, Duration::seconds(1));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = QueryRange::new(ts(200), ts(100)).unwrap_err();
        assert!(matches!(err, QueryError::Validation(_)));
    }

    #[test]
    fn test_default_range_is_last_hour() {
        let before = Utc::now();
        let range = QueryRange::from_quals(&[]).unwrap();
        let after = Utc::now();

        assert!(range.to >= before && range.to <= after);
        assert_eq!(range.to - range.from, Duration::hours(1));
    }

    #[test]
    fn test_both_bounds_resolve() {
        let quals = vec![Qual::after(ts(1000)), Qual::before(ts(4600))];
        let range = QueryRange::from_quals(&quals).unwrap();

        assert_eq!(range.from, ts(1000));
        assert_eq!(range.to, ts(4600));
        assert_eq!(range.step, Duration::seconds(4));
    }

    #[test]
    fn test_inclusive_bounds_collapse_to_same_range() {
        let exclusive = QueryRange::from_quals(&[Qual::after(ts(0)), Qual::before(ts(100))]);
        let inclusive = QueryRange::from_quals(&[
            Qual::new(
                COLUMN_TIMESTAMP,
                QualOperator::GreaterThanOrEqual,
                QualValue::Time(ts(0)),
            ),
            Qual::new(
                COLUMN_TIMESTAMP,
                QualOperator::LessThanOrEqual,
                QualValue::Time(ts(100)),
            ),
        ]);
        assert_eq!(exclusive.unwrap(), inclusive.unwrap());
    }

    #[test]
    fn test_only_lower_bound_fails() {
        let err = QueryRange::from_quals(&[Qual::after(ts(1000))]).unwrap_err();
        assert!(
            matches!(err, QueryError::Validation(msg) if msg == "ending timestamp must be specified")
        );
    }

    #[test]
    fn test_only_upper_bound_fails() {
        let err = QueryRange::from_quals(&[Qual::before(ts(1000))]).unwrap_err();
        assert!(
            matches!(err, QueryError::Validation(msg) if msg == "starting timestamp must be specified")
        );
    }

    #[test]
    fn test_non_time_bound_rejected() {
        let quals = vec![Qual::new(
            COLUMN_TIMESTAMP,
            QualOperator::GreaterThan,
            QualValue::String("yesterday".to_string()),
        )];
        assert!(matches!(
            QueryRange::from_quals(&quals),
            Err(QueryError::Validation(_))
        ));
    }
}
