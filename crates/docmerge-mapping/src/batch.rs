//! Driving a [`Resolver`] over a sequence of rows.
//!
//! [`BatchRun`] is a lazy, single-pass iterator: each call to `next` pulls one row from the source
//! and resolves it. A row that fails (a reader error, or missing columns in strict mode) yields an
//! `Err` outcome for that row and the run carries on. Rule-set errors surface before the first row
//! is read. Dropping the iterator abandons the remaining rows.

use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt;

use docmerge_expr::Row;

use crate::error::{ConfigError, FieldError, RowError};
use crate::resolver::{ResolvedRow, Resolver};
use crate::rule::MappingRule;

/// One row's result, tagged with its 1-based position in the source sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct RowOutcome {
    pub index: usize,
    pub result: Result<ResolvedRow, RowError>,
}

impl RowOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Rows from an infallible source, adapted to the fallible shape [`BatchRun`] consumes.
pub type InfallibleRows<I> = std::iter::Map<I, fn(Row) -> Result<Row, Infallible>>;

/// Lazy batch resolution. See the module docs.
#[derive(Debug)]
pub struct BatchRun<R, I> {
    resolver: R,
    rows: I,
    position: usize,
}

impl<R, I> BatchRun<R, I> {
    pub fn new(resolver: R, rows: I) -> Self {
        Self {
            resolver,
            rows,
            position: 0,
        }
    }

    /// Number of rows pulled from the source so far.
    pub fn rows_seen(&self) -> usize {
        self.position
    }
}

impl<R, I, E> Iterator for BatchRun<R, I>
where
    R: Borrow<Resolver>,
    I: Iterator<Item = Result<Row, E>>,
    E: fmt::Display,
{
    type Item = RowOutcome;

    fn next(&mut self) -> Option<RowOutcome> {
        let row = self.rows.next()?;
        self.position += 1;
        let index = self.position;

        let result = match row {
            Ok(row) => self.resolver.borrow().resolve_row(index, &row),
            Err(err) => Err(RowError::Source {
                message: err.to_string(),
            }),
        };
        if let Err(err) = &result {
            log::warn!("row {index}: {err}");
        }
        Some(RowOutcome { index, result })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl Resolver {
    /// Resolve `rows` lazily against this resolver.
    pub fn batch<I>(&self, rows: I) -> BatchRun<&Self, InfallibleRows<I::IntoIter>>
    where
        I: IntoIterator<Item = Row>,
    {
        BatchRun::new(self, infallible(rows))
    }

    /// Like [`Resolver::batch`], taking ownership of the resolver.
    pub fn into_batch<I>(self, rows: I) -> BatchRun<Self, InfallibleRows<I::IntoIter>>
    where
        I: IntoIterator<Item = Row>,
    {
        BatchRun::new(self, infallible(rows))
    }

    /// Resolve rows from a reader that can fail part-way; each failure is reported as
    /// [`RowError::Source`] for that position.
    pub fn batch_fallible<I, E>(&self, rows: I) -> BatchRun<&Self, I::IntoIter>
    where
        I: IntoIterator<Item = Result<Row, E>>,
        E: fmt::Display,
    {
        BatchRun::new(self, rows.into_iter())
    }
}

fn infallible<I>(rows: I) -> InfallibleRows<I::IntoIter>
where
    I: IntoIterator<Item = Row>,
{
    rows.into_iter()
        .map(Ok::<Row, Infallible> as fn(Row) -> Result<Row, Infallible>)
}

/// Validate `rules` and return a lazy run over `rows`.
///
/// Fails before any row is read when the rule set itself is invalid.
pub fn run_batch<I>(
    rules: impl IntoIterator<Item = MappingRule>,
    rows: I,
) -> Result<BatchRun<Resolver, InfallibleRows<I::IntoIter>>, ConfigError>
where
    I: IntoIterator<Item = Row>,
{
    Ok(Resolver::new(rules)?.into_batch(rows))
}

/// [`run_batch`] for a row source that can fail per row.
pub fn run_batch_fallible<I, E>(
    rules: impl IntoIterator<Item = MappingRule>,
    rows: I,
) -> Result<BatchRun<Resolver, I::IntoIter>, ConfigError>
where
    I: IntoIterator<Item = Result<Row, E>>,
    E: fmt::Display,
{
    Ok(BatchRun::new(Resolver::new(rules)?, rows.into_iter()))
}

/// Resolve `rows` concurrently. Outcomes come back in input order with the same indices a
/// sequential run would assign.
#[cfg(feature = "parallel")]
pub fn run_batch_parallel(resolver: &Resolver, rows: &[Row]) -> Vec<RowOutcome> {
    use rayon::prelude::*;

    let resolve = |(position, row): (usize, &Row)| {
        let index = position + 1;
        RowOutcome {
            index,
            result: resolver.resolve_row(index, row),
        }
    };

    match crate::parallel::resolve_pool() {
        Some(pool) => pool.install(|| {
            rows.par_iter()
                .enumerate()
                .map(resolve)
                .collect::<Vec<_>>()
        }),
        None => rows.iter().enumerate().map(resolve).collect(),
    }
}

/// One entry of a batch failure report.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchFailure {
    Row {
        index: usize,
        error: RowError,
    },
    Field {
        index: usize,
        field: String,
        error: FieldError,
    },
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchFailure::Row { index, error } => write!(f, "row {index}: {error}"),
            BatchFailure::Field {
                index,
                field,
                error,
            } => write!(f, "row {index}, field {field:?}: {error}"),
        }
    }
}

/// Tally of a batch for the caller's per-row, per-field failure report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchSummary {
    /// Rows that resolved, possibly with some failed fields.
    pub rows_resolved: usize,
    /// Rows that could not be resolved at all.
    pub rows_failed: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a RowOutcome>) -> Self {
        let mut summary = Self::new();
        for outcome in outcomes {
            summary.record(outcome);
        }
        summary
    }

    pub fn record(&mut self, outcome: &RowOutcome) {
        match &outcome.result {
            Ok(row) => {
                self.rows_resolved += 1;
                self.failures.extend(row.failures().filter_map(|field| {
                    field.error.clone().map(|error| BatchFailure::Field {
                        index: row.index,
                        field: field.name.clone(),
                        error,
                    })
                }));
            }
            Err(error) => {
                self.rows_failed += 1;
                self.failures.push(BatchFailure::Row {
                    index: outcome.index,
                    error: error.clone(),
                });
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.rows_resolved + self.rows_failed
    }

    pub fn failed_fields(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| matches!(f, BatchFailure::Field { .. }))
            .count()
    }

    /// No failed rows and no failed fields.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
