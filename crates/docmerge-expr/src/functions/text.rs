use crate::error::{EvalError, EvalResult};
use crate::functions::{eval_count, eval_number, eval_text, FunctionContext, FunctionSpec, VAR_ARGS};
use crate::number::format_fixed;
use crate::parser::Expr;
use crate::value::Value;

/// `number_format` refuses more decimals than an `f64` can meaningfully carry.
const MAX_FORMAT_DECIMALS: f64 = 15.0;

pub(super) static FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "concat",
        min_args: 1,
        max_args: VAR_ARGS,
        implementation: concat_fn,
    },
    FunctionSpec {
        name: "upper",
        min_args: 1,
        max_args: 1,
        implementation: upper_fn,
    },
    FunctionSpec {
        name: "lower",
        min_args: 1,
        max_args: 1,
        implementation: lower_fn,
    },
    FunctionSpec {
        name: "left",
        min_args: 2,
        max_args: 2,
        implementation: left_fn,
    },
    FunctionSpec {
        name: "right",
        min_args: 2,
        max_args: 2,
        implementation: right_fn,
    },
    FunctionSpec {
        name: "mid",
        min_args: 3,
        max_args: 3,
        implementation: mid_fn,
    },
    FunctionSpec {
        name: "strip",
        min_args: 1,
        max_args: 1,
        implementation: strip_fn,
    },
    FunctionSpec {
        name: "trim",
        min_args: 1,
        max_args: 1,
        implementation: strip_fn,
    },
    FunctionSpec {
        name: "len",
        min_args: 1,
        max_args: 1,
        implementation: len_fn,
    },
    FunctionSpec {
        name: "replace",
        min_args: 3,
        max_args: 3,
        implementation: replace_fn,
    },
    FunctionSpec {
        name: "format",
        min_args: 1,
        max_args: VAR_ARGS,
        implementation: format_fn,
    },
    FunctionSpec {
        name: "number_format",
        min_args: 1,
        max_args: 3,
        implementation: number_format_fn,
    },
];

fn concat_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let mut out = String::new();
    for arg in args {
        out.push_str(&ctx.eval_arg(arg)?.to_text());
    }
    Ok(Value::Text(out))
}

fn upper_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    Ok(Value::Text(eval_text(ctx, &args[0])?.to_uppercase()))
}

fn lower_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    Ok(Value::Text(eval_text(ctx, &args[0])?.to_lowercase()))
}

fn left_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let text = eval_text(ctx, &args[0])?;
    let n = eval_count(ctx, "left", "length", &args[1])?;
    Ok(Value::Text(text.chars().take(n).collect()))
}

fn right_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let text = eval_text(ctx, &args[0])?;
    let n = eval_count(ctx, "right", "length", &args[1])?;
    let len = text.chars().count();
    Ok(Value::Text(text.chars().skip(len.saturating_sub(n)).collect()))
}

/// `mid(s, start, len)`: `start` is a 0-based character position.
fn mid_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let text = eval_text(ctx, &args[0])?;
    let start = eval_count(ctx, "mid", "start", &args[1])?;
    let len = eval_count(ctx, "mid", "length", &args[2])?;
    Ok(Value::Text(text.chars().skip(start).take(len).collect()))
}

fn strip_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    Ok(Value::Text(eval_text(ctx, &args[0])?.trim().to_string()))
}

fn len_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let text = eval_text(ctx, &args[0])?;
    Ok(Value::Number(text.chars().count() as f64))
}

fn replace_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let text = eval_text(ctx, &args[0])?;
    let old = eval_text(ctx, &args[1])?;
    let new = eval_text(ctx, &args[2])?;
    Ok(Value::Text(text.replace(&old, &new)))
}

/// `format(template, args...)`: fills `{}` slots in order and `{n}` slots by 0-based position.
/// `{{` and `}}` stand for literal braces.
fn format_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let template = eval_text(ctx, &args[0])?;
    let mut values = Vec::with_capacity(args.len() - 1);
    for arg in &args[1..] {
        values.push(eval_text(ctx, arg)?);
    }
    fill_template(&template, &values).map(Value::Text)
}

fn fill_template(template: &str, values: &[String]) -> EvalResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut next_slot = 0;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => field.push(c),
                        None => {
                            return Err(EvalError::out_of_range(
                                "format",
                                "`{` in the template is never closed",
                            ))
                        }
                    }
                }
                let field = field.trim();
                let slot = if field.is_empty() {
                    next_slot += 1;
                    next_slot - 1
                } else {
                    field.parse::<usize>().map_err(|_| {
                        EvalError::out_of_range(
                            "format",
                            format!("slot `{{{field}}}` is not a position"),
                        )
                    })?
                };
                let value = values.get(slot).ok_or_else(|| {
                    EvalError::out_of_range(
                        "format",
                        format!("slot {slot} requested but only {} values given", values.len()),
                    )
                })?;
                out.push_str(value);
            }
            '}' => {
                return Err(EvalError::out_of_range(
                    "format",
                    "unmatched `}` in the template",
                ))
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

/// `number_format(x[, decimals[, thousands]])`, defaulting to 2 decimals with `,` grouping.
fn number_format_fn(ctx: &mut dyn FunctionContext, args: &[Expr]) -> EvalResult<Value> {
    let value = eval_number(ctx, "number_format", &args[0])?;
    let decimals = match args.get(1) {
        Some(arg) => {
            let decimals = eval_number(ctx, "number_format", arg)?.trunc();
            if !(0.0..=MAX_FORMAT_DECIMALS).contains(&decimals) {
                return Err(EvalError::out_of_range(
                    "number_format",
                    format!("decimals must be between 0 and {MAX_FORMAT_DECIMALS}, got {decimals}"),
                ));
            }
            decimals as usize
        }
        None => 2,
    };
    let group_thousands = match args.get(2) {
        Some(arg) => ctx.eval_arg(arg)?.truthy(),
        None => true,
    };
    Ok(Value::Text(format_fixed(value, decimals, group_thousands)))
}
