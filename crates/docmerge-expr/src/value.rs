use std::borrow::Cow;
use std::fmt;

use crate::number::{format_number, parse_number_text};

/// A resolved cell or expression value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Blank,
    Number(f64),
    Text(String),
    Boolean(bool),
}

/// How a value participates in comparisons.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Comparable<'a> {
    /// Blank (or empty text): compares as `0` against numbers and `""` against text.
    Flexible,
    Numeric(f64),
    Textual(&'a str),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Blank => "blank",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Blank)
    }

    /// Blank or empty text. `ifempty` and the blank-default policy both use this test.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Blank => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric view used by arithmetic and the aggregate functions.
    ///
    /// Blank and empty text are `0`, booleans are `1`/`0`, and text must parse as a number.
    /// `None` means the value cannot take part in arithmetic.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Blank => Some(0.0),
            Value::Number(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) if s.trim().is_empty() => Some(0.0),
            Value::Text(s) => parse_number_text(s),
        }
    }

    /// Text view used by concatenation and the text functions.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Blank => Cow::Borrowed(""),
            Value::Text(s) => Cow::Borrowed(s.as_str()),
            Value::Number(n) => Cow::Owned(format_number(*n)),
            Value::Boolean(b) => Cow::Borrowed(if *b { "TRUE" } else { "FALSE" }),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Value::Text(s) => s,
            other => other.to_text().into_owned(),
        }
    }

    /// Truthiness for conditional contexts: zero, Blank and empty text are false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Blank => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty(),
        }
    }

    /// Text that does not read as a number. Empty text counts as non-numeric.
    pub(crate) fn is_non_numeric_text(&self) -> bool {
        match self {
            Value::Text(s) => parse_number_text(s).is_none(),
            _ => false,
        }
    }

    pub(crate) fn comparable(&self) -> Comparable<'_> {
        match self {
            Value::Blank => Comparable::Flexible,
            Value::Number(n) => Comparable::Numeric(*n),
            Value::Boolean(b) => Comparable::Numeric(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) if s.is_empty() => Comparable::Flexible,
            Value::Text(s) => match parse_number_text(s) {
                Some(n) => Comparable::Numeric(n),
                None => Comparable::Textual(s.as_str()),
            },
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Blank
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Blank, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
