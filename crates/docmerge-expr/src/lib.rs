//! Placeholder expressions for docmerge.
//!
//! An expression is what a user types into a mapping rule: literals, `{{column}}` references,
//! arithmetic / comparison / logical operators, and calls into a fixed library of functions
//! (`concat`, `round`, `if`, `ifempty`, ...). [`parse`] turns the text into an [`Expr`] tree and
//! an [`Evaluator`] walks that tree against one [`Row`].
//!
//! ```
//! use docmerge_expr::{evaluate_str, Row, Value};
//!
//! let row = Row::new().with("n", 1500.0);
//! let value = evaluate_str(r#"if({{n}} > 1000, "big", "small")"#, &row).unwrap();
//! assert_eq!(value, Value::from("big"));
//! ```

mod error;
mod eval;
pub mod functions;
pub mod number;
mod parser;
mod row;
mod value;

pub use crate::error::{
    EvalError, EvalErrorKind, EvalResult, ExprError, ExprResult, SyntaxError, SyntaxErrorKind,
};
pub use crate::eval::{evaluate, evaluate_str, EvalWarning, Evaluator, INDEX_COLUMN};
pub use crate::parser::{
    extract_placeholders, parse, BinaryOp, Expr, UnaryOp, MAX_EXPRESSION_LEN, MAX_NESTING,
    MAX_TREE_DEPTH,
};
pub use crate::row::{ColumnMatch, Row};
pub use crate::value::Value;
