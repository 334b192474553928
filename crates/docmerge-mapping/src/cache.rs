use std::collections::HashMap;
use std::sync::Arc;

use docmerge_expr::{parse, Expr, SyntaxError};

/// Parsed expressions keyed by their source text.
///
/// Filled while a rule set is compiled and only read afterwards, so compiled rules can be shared
/// across threads.
#[derive(Debug, Default)]
pub struct ExprCache {
    entries: HashMap<String, Result<Arc<Expr>, SyntaxError>>,
}

impl ExprCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_parse(&mut self, expression: &str) -> Result<Arc<Expr>, SyntaxError> {
        if let Some(entry) = self.entries.get(expression) {
            log::debug!("expression cache hit: {expression:?}");
            return entry.clone();
        }
        let entry = parse(expression).map(Arc::new);
        self.entries.insert(expression.to_string(), entry.clone());
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
