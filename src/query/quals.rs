//! Qualifier model
//!
//! Qualifiers are the caller-supplied predicates of a tabular query: exact or
//! membership matches on the metric name, comparison bounds on the timestamp
//! column, and a containment condition on the label map. This module defines
//! the typed qual model and the extraction helpers the orchestrator runs
//! before anything touches the backend.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

use crate::query::error::{QueryError, QueryResult};

/// Column names of the metric table
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_LABELS: &str = "labels";
pub const COLUMN_TIMESTAMP: &str = "timestamp";
pub const COLUMN_VALUE: &str = "value";

/// Comparison operator of a qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualOperator {
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    /// Containment (`@>`), the one supported operator on the label map
    Contains,
}

impl fmt::Display for QualOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualOperator::Equal => write!(f, "="),
            QualOperator::GreaterThan => write!(f, ">"),
            QualOperator::GreaterThanOrEqual => write!(f, ">="),
            QualOperator::LessThan => write!(f, "<"),
            QualOperator::LessThanOrEqual => write!(f, "<="),
            QualOperator::Contains => write!(f, "@>"),
        }
    }
}

/// Value carried by a qualifier
#[derive(Debug, Clone, PartialEq)]
pub enum QualValue {
    String(String),
    /// Membership match (`name IN (...)`) arrives as an equality over a list
    Strings(Vec<String>),
    Time(DateTime<Utc>),
    Labels(BTreeMap<String, String>),
}

/// One caller-supplied constraint
#[derive(Debug, Clone, PartialEq)]
pub struct Qual {
    pub column: String,
    pub operator: QualOperator,
    pub value: QualValue,
}

impl Qual {
    pub fn new(column: impl Into<String>, operator: QualOperator, value: QualValue) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
        }
    }

    /// Equality on a string column
    pub fn equal(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column, QualOperator::Equal, QualValue::String(value.into()))
    }

    /// Membership on a string column
    pub fn any_of(column: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(column, QualOperator::Equal, QualValue::Strings(values))
    }

    /// `timestamp > t`
    pub fn after(t: DateTime<Utc>) -> Self {
        Self::new(COLUMN_TIMESTAMP, QualOperator::GreaterThan, QualValue::Time(t))
    }

    /// `timestamp < t`
    pub fn before(t: DateTime<Utc>) -> Self {
        Self::new(COLUMN_TIMESTAMP, QualOperator::LessThan, QualValue::Time(t))
    }

    /// `labels @> map`
    pub fn labels_contain(labels: BTreeMap<String, String>) -> Self {
        Self::new(COLUMN_LABELS, QualOperator::Contains, QualValue::Labels(labels))
    }
}

/// Extract the requested alias names from the qual set.
///
/// A membership list wins over a single equality match; duplicates are kept
/// and processed independently by the orchestrator. No usable name qual is a
/// validation error.
pub fn alias_names(quals: &[Qual]) -> QueryResult<Vec<String>> {
    let mut single = None;
    for qual in quals
        .iter()
        .filter(|q| q.column == COLUMN_NAME && q.operator == QualOperator::Equal)
    {
        match &qual.value {
            QualValue::Strings(list) if !list.is_empty() => return Ok(list.clone()),
            QualValue::String(name) if !name.is_empty() => single = Some(name.clone()),
            _ => {}
        }
    }

    match single {
        Some(name) => Ok(vec![name]),
        None => Err(QueryError::Validation("name parameter required".to_string())),
    }
}

/// Validate the label qualifier and produce the template's `filter` value.
///
/// Only the `@>` operator over a label map is accepted; anything else fails
/// before a backend call is made. The returned filter is currently always
/// empty.
// TODO: render the matched label map as a PromQL matcher list so registered
// templates referencing `{{.filter}}` actually narrow their selection.
pub fn label_filter(quals: &[Qual]) -> QueryResult<String> {
    for qual in quals.iter().filter(|q| q.column == COLUMN_LABELS) {
        if qual.operator != QualOperator::Contains {
            return Err(QueryError::Validation(
                "only @> operator supported on labels".to_string(),
            ));
        }
        match &qual.value {
            QualValue::Labels(_) => {}
            other => {
                return Err(QueryError::Validation(format!(
                    "labels condition must be a label map, got {other:?}"
                )))
            }
        }
    }

    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_names_single() {
        let quals = vec![Qual::equal(COLUMN_NAME, "cpu_total")];
        assert_eq!(alias_names(&quals).unwrap(), vec!["cpu_total"]);
    }

    #[test]
    fn test_alias_names_membership_wins() {
        let quals = vec![
            Qual::equal(COLUMN_NAME, "ignored"),
            Qual::any_of(
                COLUMN_NAME,
                vec!["cpu".to_string(), "mem".to_string(), "cpu".to_string()],
            ),
        ];
        // Duplicates are preserved; each is queried independently
        assert_eq!(alias_names(&quals).unwrap(), vec!["cpu", "mem", "cpu"]);
    }

    #[test]
    fn test_alias_names_missing() {
        let err = alias_names(&[Qual::after(Utc::now())]).unwrap_err();
        assert!(matches!(err, QueryError::Validation(msg) if msg == "name parameter required"));
    }

    #[test]
    fn test_alias_names_empty_string_rejected() {
        let quals = vec![Qual::equal(COLUMN_NAME, "")];
        assert!(matches!(
            alias_names(&quals),
            Err(QueryError::Validation(_))
        ));
    }

    #[test]
    fn test_label_filter_accepts_containment() {
        let mut labels = BTreeMap::new();
        labels.insert("job".to_string(), "node".to_string());
        let quals = vec![Qual::labels_contain(labels)];

        // Validated but not yet rendered: the filter stays empty
        assert_eq!(label_filter(&quals).unwrap(), "");
    }

    #[test]
    fn test_label_filter_rejects_other_operators() {
        let quals = vec![Qual::new(
            COLUMN_LABELS,
            QualOperator::Equal,
            QualValue::Labels(BTreeMap::new()),
        )];
        let err = label_filter(&quals).unwrap_err();
        assert!(
            matches!(err, QueryError::Validation(msg) if msg == "only @> operator supported on labels")
        );
    }

    #[test]
    fn test_label_filter_no_label_quals() {
        assert_eq!(label_filter(&[]).unwrap(), "");
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(QualOperator::Contains.to_string(), "@>");
        assert_eq!(QualOperator::GreaterThanOrEqual.to_string(), ">=");
    }
}
