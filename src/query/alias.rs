//! Alias registry
//!
//! Aliases map a user-facing metric name to a PromQL query template. A name
//! with no registered template is not an error: it degrades to a pass-through
//! query selecting the bare name. The two outcomes are kept as distinct
//! branches so callers (and tests) can tell them apart.

use std::collections::BTreeMap;

use crate::config::Config;

/// Named query templates from one configuration snapshot
#[derive(Debug, Clone, Default)]
pub struct AliasRegistry {
    aliases: BTreeMap<String, String>,
}

/// Outcome of resolving an alias name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasResolution {
    /// The name is registered; use its configured template
    Registered { template: String },
    /// Unknown name; the bare name becomes a selector with the (empty)
    /// filter placeholder. Renders to `name{ }`.
    Synthesized { template: String },
}

impl AliasResolution {
    pub fn template(&self) -> &str {
        match self {
            AliasResolution::Registered { template } => template,
            AliasResolution::Synthesized { template } => template,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, AliasResolution::Registered { .. })
    }
}

impl AliasRegistry {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    /// Registry over a configuration snapshot
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.aliases.clone())
    }

    /// Resolve a name to its template. Lookup is exact and case-sensitive.
    pub fn resolve(&self, name: &str) -> AliasResolution {
        match self.aliases.get(name) {
            Some(template) => AliasResolution::Registered {
                template: template.clone(),
            },
            None => AliasResolution::Synthesized {
                template: name.to_string() + "{ {{.filter}}}",
            },
        }
    }

    /// Registered (name, template) pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.aliases.iter()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
