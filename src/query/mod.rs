//! Query translation
//!
//! Turns declarative table qualifiers into executable PromQL range queries:
//!
//! - **Quals**: the typed qualifier model and extraction helpers
//! - **Range**: timestamp bounds plus the ~1000-bucket sampling step
//! - **Alias**: registered-or-synthesized template resolution
//! - **Template**: `{{.filter}}`-style parameter substitution
//!
//! The pieces are deliberately independent; the metric table orchestrator in
//! [`crate::table`] wires them together per request.

mod alias;
mod error;
mod quals;
mod range;
mod template;

pub use alias::{AliasRegistry, AliasResolution};
pub use error::{QueryError, QueryResult};
pub use quals::{
    alias_names, label_filter, Qual, QualOperator, QualValue, COLUMN_LABELS, COLUMN_NAME,
    COLUMN_TIMESTAMP, COLUMN_VALUE,
};
pub use range::QueryRange;
pub use template::{standard_params, QueryTemplate};
