use crate::error::EvalResult;
use crate::functions::{eval_number, FunctionContext, FunctionSpec, VAR_ARGS};
use crate::number::round_half_away;
use crate::parser::Expr;
use crate::value::Value;

pub(super) static FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "sum",
        min_args: 1,
        max_args: VAR_ARGS,
        implementation: sum_fn,
    },
    FunctionSpec {
        name: "avg",
        min_args: 1,
        max_args: VAR_ARGS,
        implementation: avg_fn,
    },
    FunctionSpec {
        name: "min",
        min_args: 1,
        max_args: VAR_ARGS,
        implementation: min_fn,
    },
    FunctionSpec {
        name: "max",
        min_args: 1,
        max_args: VAR_ARGS,
        implementation: max_fn,
    },
    FunctionSpec {
        name: "round",
        min_args: 2,
        max_args: 2,
        implementation: round_fn,
    },
    FunctionSpec {
        name: "abs",
        min_args: 1,
        max_args: 1,
        implementation: abs_fn,
    },
    FunctionSpec {
        name: "int",
        min_args: 1,
        max_args: 1,
        implementation: int_fn,
    },
    FunctionSpec {
        name: "float",
        min_args: 1,
        max_args: 1,
        implementation: number_fn,
    },
    FunctionSpec {
        name: "number",
        min_args: 1,
        max_args: 1,
        implementation: number_fn,
    },
];

fn eval_numbers(
    ctx: &mut dyn FunctionContext,
    function: &str,
    args: &[Expr],
) -> EvalResult<Vec<f64>> {
    args.iter()
        .map(|arg| eval_number(ctx, function, arg))
        .collect()
}

fn sum_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let total: f64 = eval_numbers(ctx, "sum", args)?.into_iter().sum();
    Ok(Value::Number(total))
}

fn avg_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let values = eval_numbers(ctx, "avg", args)?;
    let total: f64 = values.iter().sum();
    // Arity checking guarantees at least one argument.
    Ok(Value::Number(total / values.len() as f64))
}

fn min_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let values = eval_numbers(ctx, "min", args)?;
    Ok(Value::Number(values.into_iter().fold(f64::INFINITY, f64::min)))
}

fn max_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let values = eval_numbers(ctx, "max", args)?;
    Ok(Value::Number(
        values.into_iter().fold(f64::NEG_INFINITY, f64::max),
    ))
}

fn round_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let number = eval_number(ctx, "round", &args[0])?;
    let digits = eval_number(ctx, "round", &args[1])?.trunc();
    let digits = digits.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
    Ok(Value::Number(round_half_away(number, digits)))
}

fn abs_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    Ok(Value::Number(eval_number(ctx, "abs", &args[0])?.abs()))
}

/// Truncates toward zero: `int(-2.7) == -2`.
fn int_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    Ok(Value::Number(eval_number(ctx, "int", &args[0])?.trunc()))
}

fn number_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    Ok(Value::Number(eval_number(ctx, "number", &args[0])?))
}
