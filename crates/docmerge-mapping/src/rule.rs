use serde::{Deserialize, Serialize};

/// How a rule produces its value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    #[default]
    Direct,
    Expression,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleSource {
    /// Copy one column's value.
    Column(String),
    /// Evaluate an expression as typed by the user.
    Formula(String),
}

/// Replacement text for a field whose value is blank or whose resolution failed.
///
/// Applied after evaluation; Blanks inside a sub-expression still behave as `0` / `""`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultPolicy {
    pub on_blank: Option<String>,
    pub on_error: Option<String>,
}

/// One output field definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RuleJson", into = "RuleJson")]
pub struct MappingRule {
    pub name: String,
    pub source: RuleSource,
    pub default: DefaultPolicy,
}

impl MappingRule {
    pub fn direct(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: RuleSource::Column(column.into()),
            default: DefaultPolicy::default(),
        }
    }

    pub fn formula(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: RuleSource::Formula(expression.into()),
            default: DefaultPolicy::default(),
        }
    }

    /// Emit `text` instead of an empty string when the value is Blank or empty text.
    pub fn with_default(mut self, text: impl Into<String>) -> Self {
        self.default.on_blank = Some(text.into());
        self
    }

    /// Emit `text` when the field fails, instead of the resolver's error placeholder.
    pub fn with_error_text(mut self, text: impl Into<String>) -> Self {
        self.default.on_error = Some(text.into());
        self
    }

    pub fn mapping_type(&self) -> MappingType {
        match self.source {
            RuleSource::Column(_) => MappingType::Direct,
            RuleSource::Formula(_) => MappingType::Expression,
        }
    }

    /// The rule written as an expression: `{{column}}` for direct rules.
    pub fn expression(&self) -> String {
        match &self.source {
            RuleSource::Column(column) if column.is_empty() => String::new(),
            RuleSource::Column(column) => format!("{{{{{column}}}}}"),
            RuleSource::Formula(expression) => expression.clone(),
        }
    }
}

/// Saved-configuration shape of a rule.
#[derive(Debug, Serialize, Deserialize)]
struct RuleJson {
    placeholder: String,
    #[serde(rename = "type", default)]
    kind: MappingType,
    #[serde(default)]
    source: String,
    #[serde(default)]
    expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    on_error: Option<String>,
}

impl From<RuleJson> for MappingRule {
    fn from(json: RuleJson) -> Self {
        let source = match json.kind {
            MappingType::Direct => RuleSource::Column(json.source),
            MappingType::Expression => RuleSource::Formula(json.expression),
        };
        MappingRule {
            name: json.placeholder,
            source,
            default: DefaultPolicy {
                on_blank: json.default,
                on_error: json.on_error,
            },
        }
    }
}

impl From<MappingRule> for RuleJson {
    fn from(rule: MappingRule) -> Self {
        let (kind, source, expression) = match rule.source {
            RuleSource::Column(column) => (MappingType::Direct, column, String::new()),
            RuleSource::Formula(expression) => (MappingType::Expression, String::new(), expression),
        };
        RuleJson {
            placeholder: rule.name,
            kind,
            source,
            expression,
            default: rule.default.on_blank,
            on_error: rule.default.on_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn direct_rules_read_as_placeholder_expressions() {
        assert_eq!(MappingRule::direct("name", "Full Name").expression(), "{{Full Name}}");
        assert_eq!(MappingRule::direct("name", "").expression(), "");
        assert_eq!(
            MappingRule::formula("total", "{{a}} + {{b}}").expression(),
            "{{a}} + {{b}}"
        );
    }

    #[test]
    fn builder_sets_default_policy() {
        let rule = MappingRule::formula("x", "{{a}}")
            .with_default("-")
            .with_error_text("#ERR");
        assert_eq!(
            rule.default,
            DefaultPolicy {
                on_blank: Some("-".into()),
                on_error: Some("#ERR".into()),
            }
        );
        assert_eq!(rule.mapping_type(), MappingType::Expression);
    }
}
