//! Tree-walking evaluation of [`Expr`] against a [`Row`].
//!
//! Evaluation is pure: it reads the row, never mutates it, and either produces exactly one
//! [`Value`] or an [`EvalError`]. Column references that cannot be matched exactly degrade
//! gracefully (case-insensitive fallback, then Blank) and are reported as [`EvalWarning`]s.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{EvalError, EvalResult, ExprResult};
use crate::functions::{call_function, FunctionContext};
use crate::parser::{parse, BinaryOp, Expr, UnaryOp};
use crate::row::{ColumnMatch, Row};
use crate::value::{Comparable, Value};

/// Reserved pseudo-column holding the 1-based position of the row within its batch.
pub const INDEX_COLUMN: &str = "_index";

/// A non-fatal problem noticed while evaluating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalWarning {
    /// `{{requested}}` had no exact match and was read from `matched` instead.
    CaseInsensitiveMatch { requested: String, matched: String },
    /// `{{column}}` matched nothing and evaluated as Blank.
    MissingColumn { column: String },
}

impl fmt::Display for EvalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalWarning::CaseInsensitiveMatch { requested, matched } => write!(
                f,
                "column {requested:?} not found; using {matched:?} (case-insensitive match)"
            ),
            EvalWarning::MissingColumn { column } => {
                write!(f, "column {column:?} not found; treated as blank")
            }
        }
    }
}

/// Evaluates expressions against one row.
///
/// Warnings accumulate across calls until taken with [`Evaluator::take_warnings`].
#[derive(Debug)]
pub struct Evaluator<'a> {
    row: &'a Row,
    row_index: Option<usize>,
    warnings: Vec<EvalWarning>,
}

impl<'a> Evaluator<'a> {
    pub fn new(row: &'a Row) -> Self {
        Self {
            row,
            row_index: None,
            warnings: Vec::new(),
        }
    }

    /// Bind the reserved `_index` column to `index` (1-based).
    pub fn with_row_index(mut self, index: usize) -> Self {
        self.row_index = Some(index);
        self
    }

    pub fn row(&self) -> &'a Row {
        self.row
    }

    pub fn warnings(&self) -> &[EvalWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<EvalWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::ColumnRef(name) => Ok(self.column(name)),
            Expr::UnaryOp { op, expr } => {
                let value = self.evaluate(expr)?;
                eval_unary(*op, value)
            }
            Expr::BinaryOp {
                op: BinaryOp::And,
                left,
                right,
            } => {
                if !self.eval_logical_operand(BinaryOp::And, left)? {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.eval_logical_operand(BinaryOp::And, right)?))
            }
            Expr::BinaryOp {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                if self.eval_logical_operand(BinaryOp::Or, left)? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.eval_logical_operand(BinaryOp::Or, right)?))
            }
            Expr::BinaryOp { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                eval_binary(*op, left, right)
            }
            Expr::Call { name, args } => call_function(self, name, args),
        }
    }

    /// Resolve a column the way `{{name}}` does, including `_index` and the case-insensitive
    /// fallback. Missing columns are Blank.
    pub fn column(&mut self, name: &str) -> Value {
        if name == INDEX_COLUMN {
            if let Some(index) = self.row_index {
                return Value::from(index);
            }
        }

        match self.row.lookup(name) {
            Some(ColumnMatch::Exact(value)) => value.clone(),
            Some(ColumnMatch::CaseInsensitive { column, value }) => {
                log::warn!("column {name:?} not found; using case-insensitive match {column:?}");
                self.warnings.push(EvalWarning::CaseInsensitiveMatch {
                    requested: name.to_string(),
                    matched: column.to_string(),
                });
                value.clone()
            }
            None => {
                log::warn!("column {name:?} not found; treating as blank");
                self.warnings.push(EvalWarning::MissingColumn {
                    column: name.to_string(),
                });
                Value::Blank
            }
        }
    }

    fn eval_logical_operand(&mut self, op: BinaryOp, expr: &Expr) -> EvalResult<bool> {
        match self.evaluate(expr)? {
            Value::Boolean(b) => Ok(b),
            other => Err(EvalError::TypeMismatch(format!(
                "`{}` expects boolean operands, got {} {:?}",
                op.symbol(),
                other.kind_name(),
                other.to_text()
            ))),
        }
    }
}

impl FunctionContext for Evaluator<'_> {
    fn eval_arg(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.evaluate(expr)
    }
}

fn eval_unary(op: UnaryOp, value: Value) -> EvalResult<Value> {
    match op {
        UnaryOp::Negate => {
            let n = coerce_number("-", &value)?;
            Ok(Value::Number(-n))
        }
        UnaryOp::Not => match value {
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            other => Err(EvalError::TypeMismatch(format!(
                "`!` expects a boolean, got {} {:?}",
                other.kind_name(),
                other.to_text()
            ))),
        },
    }
}

fn eval_binary(op: BinaryOp, left: Value, right: Value) -> EvalResult<Value> {
    match op {
        BinaryOp::Add if is_concatenation(&left, &right) => Ok(concat(&left, &right)),
        BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide => {
            let l = coerce_number(op.symbol(), &left)?;
            let r = coerce_number(op.symbol(), &right)?;
            let out = match op {
                BinaryOp::Add => l + r,
                BinaryOp::Subtract => l - r,
                BinaryOp::Multiply => l * r,
                BinaryOp::Divide => {
                    if r == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    l / r
                }
                _ => unreachable!("non-arithmetic operator {op:?}"),
            };
            Ok(Value::Number(out))
        }
        BinaryOp::Concat => Ok(concat(&left, &right)),
        BinaryOp::Equals
        | BinaryOp::NotEquals
        | BinaryOp::Less
        | BinaryOp::LessEquals
        | BinaryOp::Greater
        | BinaryOp::GreaterEquals => Ok(Value::Boolean(compare_values(op, &left, &right)?)),
        BinaryOp::And | BinaryOp::Or => {
            // Handled by `Evaluator::evaluate` so the right operand can be skipped.
            unreachable!("logical operator {op:?} reached eval_binary")
        }
    }
}

/// `+` concatenates when both sides are text, or when either side is text that does not read as
/// a number.
fn is_concatenation(left: &Value, right: &Value) -> bool {
    matches!((left, right), (Value::Text(_), Value::Text(_)))
        || left.is_non_numeric_text()
        || right.is_non_numeric_text()
}

fn concat(left: &Value, right: &Value) -> Value {
    let l = left.to_text();
    let r = right.to_text();
    let mut out = String::with_capacity(l.len() + r.len());
    out.push_str(&l);
    out.push_str(&r);
    Value::Text(out)
}

fn coerce_number(op: &str, value: &Value) -> EvalResult<f64> {
    value.to_number().ok_or_else(|| {
        EvalError::TypeMismatch(format!(
            "`{op}` expects numbers, got {} {:?}",
            value.kind_name(),
            value.to_text()
        ))
    })
}

fn compare_values(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<bool> {
    let cmp = match (left.comparable(), right.comparable()) {
        (Comparable::Flexible, Comparable::Flexible) => Ordering::Equal,
        (Comparable::Numeric(l), Comparable::Numeric(r)) => compare_numbers(op, l, r, left, right)?,
        (Comparable::Flexible, Comparable::Numeric(r)) => compare_numbers(op, 0.0, r, left, right)?,
        (Comparable::Numeric(l), Comparable::Flexible) => compare_numbers(op, l, 0.0, left, right)?,
        (Comparable::Textual(l), Comparable::Textual(r)) => l.cmp(r),
        (Comparable::Flexible, Comparable::Textual(r)) => "".cmp(r),
        (Comparable::Textual(l), Comparable::Flexible) => l.cmp(""),
        (Comparable::Numeric(_), Comparable::Textual(_))
        | (Comparable::Textual(_), Comparable::Numeric(_)) => {
            return Err(mismatched_comparison(op, left, right))
        }
    };

    Ok(match op {
        BinaryOp::Equals => cmp == Ordering::Equal,
        BinaryOp::NotEquals => cmp != Ordering::Equal,
        BinaryOp::Less => cmp == Ordering::Less,
        BinaryOp::LessEquals => cmp != Ordering::Greater,
        BinaryOp::Greater => cmp == Ordering::Greater,
        BinaryOp::GreaterEquals => cmp != Ordering::Less,
        _ => unreachable!("unexpected comparison operator {op:?}"),
    })
}

fn compare_numbers(
    op: BinaryOp,
    l: f64,
    r: f64,
    left: &Value,
    right: &Value,
) -> EvalResult<Ordering> {
    l.partial_cmp(&r)
        .ok_or_else(|| mismatched_comparison(op, left, right))
}

fn mismatched_comparison(op: BinaryOp, left: &Value, right: &Value) -> EvalError {
    EvalError::TypeMismatch(format!(
        "cannot compare {} {:?} with {} {:?} using `{}`",
        left.kind_name(),
        left.to_text(),
        right.kind_name(),
        right.to_text(),
        op.symbol()
    ))
}

/// Evaluate a parsed expression against `row` (without an `_index` binding).
pub fn evaluate(expr: &Expr, row: &Row) -> EvalResult<Value> {
    Evaluator::new(row).evaluate(expr)
}

/// Parse and evaluate in one step.
pub fn evaluate_str(expression: &str, row: &Row) -> ExprResult<Value> {
    let expr = parse(expression)?;
    Ok(evaluate(&expr, row)?)
}
