//! Per-row resolution of an ordered rule set into rendered field text.
//!
//! A [`Resolver`] validates and compiles the rules once: names are checked for emptiness and
//! uniqueness, formulas are parsed through an [`ExprCache`], and the columns each rule reads are
//! collected. Resolving a row then only walks the cached trees. Every rule resolves on its own; a
//! failing rule yields a failed [`ResolvedField`] and never affects its siblings.

use std::collections::HashSet;
use std::sync::Arc;

use docmerge_expr::{Evaluator, EvalWarning, Expr, Row, SyntaxError, Value, INDEX_COLUMN};

use crate::cache::ExprCache;
use crate::config::{MappingConfig, ResolverOptions};
use crate::error::{ConfigError, FieldError, RowError};
use crate::rule::{MappingRule, RuleSource};

/// The outcome of one rule for one row.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedField {
    pub name: String,
    /// Text handed to the renderer. On failure this is the rule's error text, or the resolver's
    /// error placeholder.
    pub text: String,
    /// The evaluated value before default substitution. `None` when the field failed.
    pub value: Option<Value>,
    pub error: Option<FieldError>,
    pub warnings: Vec<EvalWarning>,
}

impl ResolvedField {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// All fields of one row, in rule order.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRow {
    /// 1-based position of the row in its batch.
    pub index: usize,
    pub fields: Vec<ResolvedField>,
}

impl ResolvedRow {
    pub fn get(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Rendered text of the field named `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).map(|f| f.text.as_str())
    }

    /// `(name, text)` pairs in rule order.
    pub fn iter_text(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.text.as_str()))
    }

    pub fn failures(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(|f| f.is_failed())
    }

    pub fn has_failures(&self) -> bool {
        self.fields.iter().any(ResolvedField::is_failed)
    }
}

#[derive(Debug)]
enum Plan {
    Column(String),
    Formula(Arc<Expr>),
    /// The formula did not parse; every row reports this error for the field.
    Invalid(SyntaxError),
}

#[derive(Debug)]
struct CompiledRule {
    rule: MappingRule,
    plan: Plan,
}

/// A validated, compiled rule set.
///
/// Immutable after construction, so one resolver can serve any number of rows, including from
/// several threads at once.
#[derive(Debug)]
pub struct Resolver {
    rules: Vec<CompiledRule>,
    options: ResolverOptions,
    required_columns: Vec<String>,
}

impl Resolver {
    pub fn new(rules: impl IntoIterator<Item = MappingRule>) -> Result<Self, ConfigError> {
        Self::with_options(rules, ResolverOptions::default())
    }

    pub fn with_options(
        rules: impl IntoIterator<Item = MappingRule>,
        options: ResolverOptions,
    ) -> Result<Self, ConfigError> {
        let mut cache = ExprCache::new();
        let mut names = HashSet::new();
        let mut compiled = Vec::new();

        for (position, rule) in rules.into_iter().enumerate() {
            if rule.name.trim().is_empty() {
                return Err(ConfigError::EmptyName {
                    position: position + 1,
                });
            }
            if !names.insert(rule.name.clone()) {
                return Err(ConfigError::DuplicateName(rule.name));
            }

            let plan = match &rule.source {
                RuleSource::Column(column) if column.trim().is_empty() => {
                    return Err(ConfigError::EmptySource(rule.name));
                }
                RuleSource::Column(column) => Plan::Column(column.clone()),
                RuleSource::Formula(expression) => match cache.get_or_parse(expression) {
                    Ok(expr) => Plan::Formula(expr),
                    Err(err) => {
                        log::warn!("mapping rule {:?}: {err}", rule.name);
                        Plan::Invalid(err)
                    }
                },
            };
            compiled.push(CompiledRule { rule, plan });
        }

        let required_columns = required_columns(&compiled);
        log::debug!(
            "compiled {} mapping rules ({} distinct formulas, {} referenced columns)",
            compiled.len(),
            cache.len(),
            required_columns.len()
        );

        Ok(Self {
            rules: compiled,
            options,
            required_columns,
        })
    }

    pub fn from_config(config: &MappingConfig) -> Result<Self, ConfigError> {
        Self::with_options(config.rules.iter().cloned(), config.options.clone())
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &MappingRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Columns read by any rule, in first-use order. `_index` is not included.
    pub fn required_columns(&self) -> &[String] {
        &self.required_columns
    }

    /// Rules whose formula failed to parse.
    pub fn syntax_errors(&self) -> impl Iterator<Item = (&str, &SyntaxError)> {
        self.rules.iter().filter_map(|c| match &c.plan {
            Plan::Invalid(err) => Some((c.rule.name.as_str(), err)),
            _ => None,
        })
    }

    /// Resolve every rule against `row`, which sits at 1-based position `index` of its batch.
    ///
    /// Only a row-level problem (missing columns under `strict_columns`) is an `Err`; field
    /// failures are reported inside the returned row.
    pub fn resolve_row(&self, index: usize, row: &Row) -> Result<ResolvedRow, RowError> {
        if self.options.strict_columns {
            let missing: Vec<String> = self
                .required_columns
                .iter()
                .filter(|column| row.lookup(column).is_none())
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(RowError::MissingColumns { columns: missing });
            }
        }
        Ok(self.resolve_fields(index, row))
    }

    fn resolve_fields(&self, index: usize, row: &Row) -> ResolvedRow {
        let fields: Vec<ResolvedField> = self
            .rules
            .iter()
            .map(|compiled| self.resolve_field(compiled, index, row))
            .collect();
        log::debug!(
            "row {index}: resolved {} fields, {} failed",
            fields.len(),
            fields.iter().filter(|f| f.is_failed()).count()
        );
        ResolvedRow { index, fields }
    }

    fn resolve_field(&self, compiled: &CompiledRule, index: usize, row: &Row) -> ResolvedField {
        let rule = &compiled.rule;
        let mut evaluator = Evaluator::new(row).with_row_index(index);
        let result = match &compiled.plan {
            Plan::Column(column) => Ok(evaluator.column(column)),
            Plan::Formula(expr) => evaluator.evaluate(expr).map_err(FieldError::from),
            Plan::Invalid(err) => Err(FieldError::from(err.clone())),
        };
        let warnings = evaluator.take_warnings();

        match result {
            Ok(value) => {
                let text = match (&rule.default.on_blank, value.is_empty()) {
                    (Some(default), true) => default.clone(),
                    _ => value.to_text().into_owned(),
                };
                log::trace!("row {index}: {:?} = {text:?}", rule.name);
                ResolvedField {
                    name: rule.name.clone(),
                    text,
                    value: Some(value),
                    error: None,
                    warnings,
                }
            }
            Err(error) => {
                log::trace!("row {index}: {:?} failed: {error}", rule.name);
                let text = rule
                    .default
                    .on_error
                    .clone()
                    .unwrap_or_else(|| self.options.error_placeholder.clone());
                ResolvedField {
                    name: rule.name.clone(),
                    text,
                    value: None,
                    error: Some(error),
                    warnings,
                }
            }
        }
    }
}

fn required_columns(rules: &[CompiledRule]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for compiled in rules {
        let columns = match &compiled.plan {
            Plan::Column(column) => vec![column.as_str()],
            Plan::Formula(expr) => expr.column_refs(),
            Plan::Invalid(_) => Vec::new(),
        };
        for column in columns {
            if column != INDEX_COLUMN && seen.insert(column) {
                out.push(column.to_string());
            }
        }
    }
    out
}

/// Resolve `rules` against a single row at batch position 1.
pub fn resolve(rules: &[MappingRule], row: &Row) -> Result<ResolvedRow, ConfigError> {
    let resolver = Resolver::new(rules.iter().cloned())?;
    Ok(resolver.resolve_fields(1, row))
}
