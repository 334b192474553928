use std::collections::HashMap;

use crate::value::Value;

/// One record of tabular input: an ordered mapping from column name to cell value.
///
/// Column names are case-sensitive and unique; inserting an existing name replaces its value in
/// place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
    column_index: HashMap<String, usize>,
}

/// Result of looking a column up by name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColumnMatch<'a> {
    Exact(&'a Value),
    /// No exact match; `column` is the first column whose name differs only by case.
    CaseInsensitive { column: &'a str, value: &'a Value },
}

impl<'a> ColumnMatch<'a> {
    pub fn value(self) -> &'a Value {
        match self {
            ColumnMatch::Exact(value) => value,
            ColumnMatch::CaseInsensitive { value, .. } => value,
        }
    }
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
            column_index: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.column_index.get(&column) {
            Some(&idx) => self.columns[idx].1 = value,
            None => {
                self.column_index.insert(column.clone(), self.columns.len());
                self.columns.push((column, value));
            }
        }
    }

    /// Builder form of [`Row::insert`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.column_index
            .get(column)
            .map(|&idx| &self.columns[idx].1)
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.column_index.contains_key(column)
    }

    /// Look a column up exactly, falling back to the first column whose name matches ignoring
    /// case.
    pub fn lookup(&self, column: &str) -> Option<ColumnMatch<'_>> {
        if let Some(value) = self.get(column) {
            return Some(ColumnMatch::Exact(value));
        }
        self.columns
            .iter()
            .find(|(name, _)| eq_ignore_case(name, column))
            .map(|(name, value)| ColumnMatch::CaseInsensitive {
                column: name.as_str(),
                value,
            })
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_replaces_in_place() {
        let mut row = Row::new().with("a", 1.0).with("b", "x");
        row.insert("a", 2.0);
        let names: Vec<&str> = row.column_names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(row.get("a"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn lookup_prefers_exact_match() {
        let row = Row::new().with("Name", "upper").with("name", "lower");
        assert_eq!(row.lookup("name"), Some(ColumnMatch::Exact(&Value::from("lower"))));
    }

    #[test]
    fn lookup_falls_back_to_case_insensitive() {
        let row = Row::new().with("Straße", 1.0);
        let found = row.lookup("STRASSE");
        assert_eq!(found, None);
        let found = row.lookup("straße").map(ColumnMatch::value);
        assert_eq!(found, Some(&Value::Number(1.0)));
    }
}
