use crate::error::EvalResult;
use crate::functions::{FunctionContext, FunctionSpec};
use crate::parser::Expr;
use crate::value::Value;

pub(super) static FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "if",
        min_args: 3,
        max_args: 3,
        implementation: if_fn,
    },
    FunctionSpec {
        name: "ifempty",
        min_args: 2,
        max_args: 2,
        implementation: ifempty_fn,
    },
];

/// Only the selected branch is evaluated, so an erroring branch that is not taken is harmless.
fn if_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let cond = ctx.eval_arg(&args[0])?.truthy();
    if cond {
        ctx.eval_arg(&args[1])
    } else {
        ctx.eval_arg(&args[2])
    }
}

fn ifempty_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let value = ctx.eval_arg(&args[0])?;
    if value.is_empty() {
        ctx.eval_arg(&args[1])
    } else {
        Ok(value)
    }
}
