//! Query template rendering
//!
//! Alias templates are PromQL text with `{{.param}}` placeholders. Rendering
//! is plain textual substitution; the only parameter the orchestrator binds
//! today is `filter`. Unknown parameters and unbalanced delimiters are
//! rejected rather than passed through to the backend.

use regex::Regex;
use std::collections::BTreeMap;

use crate::query::error::{QueryError, QueryResult};

/// A parsed query template
#[derive(Debug, Clone)]
pub struct QueryTemplate {
    source: String,
}

fn param_pattern() -> QueryResult<Regex> {
    Regex::new(r"\{\{\s*\.?([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
        .map_err(|_| QueryError::Template("parameter pattern failed to compile".to_string()))
}

impl QueryTemplate {
    /// Parse a template, validating delimiter pairing
    pub fn parse(source: impl Into<String>) -> QueryResult<Self> {
        let source = source.into();
        let pattern = param_pattern()?;

        // Everything left after removing well-formed placeholders must be
        // free of delimiter fragments. PromQL's own braces are single, so
        // `{{` outside a placeholder is always a template mistake.
        let stripped = pattern.replace_all(&source, "");
        if stripped.contains("{{") || stripped.contains("}}") {
            return Err(QueryError::Template(format!(
                "unbalanced parameter delimiters in template {source:?}"
            )));
        }

        Ok(Self { source })
    }

    /// Names of the parameters the template references, in order of appearance
    pub fn param_names(&self) -> QueryResult<Vec<String>> {
        let pattern = param_pattern()?;
        Ok(pattern
            .captures_iter(&self.source)
            .map(|caps| caps[1].to_string())
            .collect())
    }

    /// Substitute parameters into the template
    pub fn render(&self, params: &BTreeMap<String, String>) -> QueryResult<String> {
        for name in self.param_names()? {
            if !params.contains_key(&name) {
                return Err(QueryError::Template(format!(
                    "unknown template parameter {name:?}"
                )));
            }
        }

        let pattern = param_pattern()?;
        let rendered = pattern.replace_all(&self.source, |caps: &regex::Captures| {
            params.get(&caps[1]).cloned().unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}

/// The parameter set every query is rendered with
pub fn standard_params(filter: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("filter".to_string(), filter.to_string());
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_filter() {
        let template = QueryTemplate::parse("node_memory_used{ {{.filter}} }").unwrap();
        let rendered = template.render(&standard_params("")).unwrap();
        assert_eq!(rendered, "node_memory_used{  }");
    }

    #[test]
    fn test_render_nonempty_filter() {
        let template = QueryTemplate::parse("rate(http_requests_total{ {{.filter}} }[5m])").unwrap();
        let rendered = template
            .render(&standard_params(r#"job="api""#))
            .unwrap();
        assert_eq!(rendered, r#"rate(http_requests_total{ job="api" }[5m])"#);
    }

    #[test]
    fn test_template_without_params_passes_through() {
        let template = QueryTemplate::parse("sum(rate(node_cpu_seconds_total[5m]))").unwrap();
        let rendered = template.render(&standard_params("")).unwrap();
        assert_eq!(rendered, "sum(rate(node_cpu_seconds_total[5m]))");
    }

    #[test]
    fn test_dot_prefix_is_optional() {
        let template = QueryTemplate::parse("up{ {{filter}} }").unwrap();
        assert_eq!(template.param_names().unwrap(), vec!["filter"]);
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let template = QueryTemplate::parse("up{ {{.instance}} }").unwrap();
        let err = template.render(&standard_params("")).unwrap_err();
        assert!(matches!(err, QueryError::Template(msg) if msg.contains("instance")));
    }

    #[test]
    fn test_unbalanced_delimiters_rejected() {
        assert!(matches!(
            QueryTemplate::parse("up{ {{.filter }"),
            Err(QueryError::Template(_))
        ));
        assert!(matches!(
            QueryTemplate::parse("up{ .filter}} }"),
            Err(QueryError::Template(_))
        ));
    }

    #[test]
    fn test_promql_braces_are_not_placeholders() {
        let template = QueryTemplate::parse(r#"up{job="node"}"#).unwrap();
        assert!(template.param_names().unwrap().is_empty());
        assert_eq!(
            template.render(&standard_params("")).unwrap(),
            r#"up{job="node"}"#
        );
    }
}
