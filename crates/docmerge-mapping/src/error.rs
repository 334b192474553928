use docmerge_expr::ExprError;

/// Why a single field failed: the formula did not parse, or it did not evaluate for this row.
pub type FieldError = ExprError;

/// A problem with the rule set as a whole. Detected before any row is resolved.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("duplicate output field name: {0:?}")]
    DuplicateName(String),

    #[error("mapping rule #{position} has an empty output name")]
    EmptyName { position: usize },

    #[error("direct mapping rule {0:?} has no source column")]
    EmptySource(String),

    #[error("invalid mapping json: {0}")]
    InvalidJson(String),
}

/// A row that could not be resolved at all. Other rows in the batch are unaffected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("row source failed: {message}")]
    Source { message: String },

    #[error("row is missing columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_columns_message_lists_names() {
        let err = RowError::MissingColumns {
            columns: vec!["price".into(), "qty".into()],
        };
        assert_eq!(err.to_string(), "row is missing columns: price, qty");
    }
}
