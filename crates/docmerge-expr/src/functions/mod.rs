//! The fixed built-in function library.
//!
//! Functions are looked up case-insensitively by name. The parser rejects names that are not in
//! the registry; arity is checked when the call is evaluated. Implementations receive their
//! arguments unevaluated so that `if` and `ifempty` can short-circuit.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{EvalError, EvalResult};
use crate::parser::Expr;
use crate::value::Value;

mod logical;
mod math;
mod text;

/// `max_args` for variadic functions.
pub const VAR_ARGS: usize = usize::MAX;

/// Evaluation hooks available to a function implementation.
pub trait FunctionContext {
    fn eval_arg(&mut self, expr: &Expr) -> EvalResult<Value>;
}

pub type FunctionImpl = fn(&mut dyn FunctionContext, &[Expr]) -> EvalResult<Value>;

#[derive(Clone, Copy)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub implementation: FunctionImpl,
}

impl FunctionSpec {
    pub fn accepts(&self, arg_count: usize) -> bool {
        arg_count >= self.min_args && arg_count <= self.max_args
    }
}

impl std::fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish_non_exhaustive()
    }
}

fn registry() -> &'static HashMap<&'static str, &'static FunctionSpec> {
    static REGISTRY: OnceLock<HashMap<&'static str, &'static FunctionSpec>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        builtin_functions()
            .map(|spec| (spec.name, spec))
            .collect()
    })
}

/// Every built-in, grouped by module.
pub fn builtin_functions() -> impl Iterator<Item = &'static FunctionSpec> {
    text::FUNCTIONS
        .iter()
        .chain(math::FUNCTIONS)
        .chain(logical::FUNCTIONS)
}

pub fn lookup_function(name: &str) -> Option<&'static FunctionSpec> {
    if let Some(spec) = registry().get(name).copied() {
        return Some(spec);
    }
    registry().get(name.to_ascii_lowercase().as_str()).copied()
}

pub fn call_function(ctx: &mut dyn FunctionContext, name: &str, args: &[Expr]) -> EvalResult<Value> {
    let spec = lookup_function(name).ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;

    if !spec.accepts(args.len()) {
        return Err(EvalError::ArityMismatch {
            function: spec.name.to_string(),
            min: spec.min_args,
            max: spec.max_args,
            got: args.len(),
        });
    }

    (spec.implementation)(ctx, args)
}

pub(crate) fn eval_number(
    ctx: &mut dyn FunctionContext,
    function: &str,
    arg: &Expr,
) -> EvalResult<f64> {
    let value = ctx.eval_arg(arg)?;
    value.to_number().ok_or_else(|| {
        EvalError::TypeMismatch(format!(
            "{function}() expects a number, got {} {:?}",
            value.kind_name(),
            value.to_text()
        ))
    })
}

pub(crate) fn eval_text(ctx: &mut dyn FunctionContext, arg: &Expr) -> EvalResult<String> {
    Ok(ctx.eval_arg(arg)?.into_text())
}

/// Count-like arguments (`left`'s `n`, `mid`'s `start`): truncated toward zero, never negative.
pub(crate) fn eval_count(
    ctx: &mut dyn FunctionContext,
    function: &str,
    what: &str,
    arg: &Expr,
) -> EvalResult<usize> {
    let n = eval_number(ctx, function, arg)?.trunc();
    if n < 0.0 {
        return Err(EvalError::out_of_range(
            function,
            format!("{what} must not be negative, got {n}"),
        ));
    }
    // Saturating float -> int conversion; anything past usize::MAX means "all of it".
    Ok(n as usize)
}
