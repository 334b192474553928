use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rule::MappingRule;

/// Resolver behaviour that is not tied to one rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Text emitted for a failed field without its own `on_error` text.
    pub error_placeholder: String,
    /// Fail the whole row when a column read by any rule is absent, instead of treating it as
    /// Blank.
    pub strict_columns: bool,
}

/// An ordered rule set plus resolver options, as saved by the configuration UI.
///
/// Unknown keys in the JSON (file paths, sheet selection, ...) are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default)]
    pub rules: Vec<MappingRule>,
    #[serde(default)]
    pub options: ResolverOptions,
}

impl MappingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::InvalidJson(err.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|err| ConfigError::InvalidJson(err.to_string()))
    }

    /// Append `rule`, dropping any existing rule with the same output name.
    pub fn add_rule(&mut self, rule: MappingRule) {
        self.rules.retain(|r| r.name != rule.name);
        self.rules.push(rule);
    }

    /// Remove the rule named `name`, returning it if present.
    pub fn remove_rule(&mut self, name: &str) -> Option<MappingRule> {
        let pos = self.rules.iter().position(|r| r.name == name)?;
        Some(self.rules.remove(pos))
    }

    pub fn get_rule(&self, name: &str) -> Option<&MappingRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn clear_rules(&mut self) {
        self.rules.clear();
    }

    /// Add a direct rule for every placeholder that has an identically named column.
    ///
    /// Returns the number of rules added.
    pub fn auto_map<C, P>(&mut self, columns: &[C], placeholders: &[P]) -> usize
    where
        C: AsRef<str>,
        P: AsRef<str>,
    {
        let mut added = 0;
        for placeholder in placeholders {
            let placeholder = placeholder.as_ref();
            if columns.iter().any(|c| c.as_ref() == placeholder) {
                self.add_rule(MappingRule::direct(placeholder, placeholder));
                added += 1;
            }
        }
        added
    }
}
