//! Mapping rules and batch resolution for docmerge.
//!
//! A [`MappingRule`] names one output field and says where its value comes from: a column
//! (direct mode) or a formula. A [`Resolver`] compiles an ordered rule set once and turns each
//! input [`Row`] into a [`ResolvedRow`] of rendered field text; [`run_batch`] drives it over a
//! whole row source.
//!
//! ```
//! use docmerge_expr::Row;
//! use docmerge_mapping::{run_batch, MappingRule};
//!
//! let rules = vec![
//!     MappingRule::direct("name", "Name"),
//!     MappingRule::formula("file", "concat('letter_', {{_index}})"),
//! ];
//! let rows = vec![Row::new().with("Name", "Ada"), Row::new().with("Name", "Grace")];
//!
//! let outcomes: Vec<_> = run_batch(rules, rows).unwrap().collect();
//! let second = outcomes[1].result.as_ref().unwrap();
//! assert_eq!(second.text("name"), Some("Grace"));
//! assert_eq!(second.text("file"), Some("letter_2"));
//! ```

mod batch;
mod cache;
mod config;
mod error;
#[cfg(feature = "parallel")]
mod parallel;
mod resolver;
mod rule;

#[cfg(feature = "parallel")]
pub use crate::batch::run_batch_parallel;
pub use crate::batch::{
    run_batch, run_batch_fallible, BatchFailure, BatchRun, BatchSummary, InfallibleRows,
    RowOutcome,
};
pub use crate::cache::ExprCache;
pub use crate::config::{MappingConfig, ResolverOptions};
pub use crate::error::{ConfigError, FieldError, RowError};
pub use crate::resolver::{resolve, ResolvedField, ResolvedRow, Resolver};
pub use crate::rule::{DefaultPolicy, MappingRule, MappingType, RuleSource};

pub use docmerge_expr::{Row, Value};
