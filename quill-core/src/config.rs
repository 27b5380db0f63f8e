//! Parser configuration.

use crate::error::ConfigError;
use crate::target::Target;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Import entry naming the namespace of the code being parsed.
pub const NAMESPACE_IMPORT: &str = "__NAMESPACE__";

/// How annotation names are resolved and which unresolved names are tolerated.
///
/// `namespaces` and `imports` are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Candidate namespace prefixes, tried in order.
    pub namespaces: Vec<String>,
    /// Alias → fully-qualified name. Aliases are matched case-insensitively.
    pub imports: BTreeMap<String, String>,
    pub ignored_annotation_names: BTreeSet<String>,
    pub ignored_annotation_namespaces: BTreeSet<String>,
    pub ignore_not_imported_annotations: bool,
    /// Target of top-level annotations; empty disables target checks.
    pub target: Target,
}

impl ParserConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.namespaces.is_empty() && !self.imports.is_empty() {
            return Err(ConfigError::ImportsAndNamespacesMixed);
        }
        for namespace in &self.namespaces {
            if namespace.trim_matches('\\').is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "namespaces".to_string(),
                    value: namespace.clone(),
                    reason: "namespace must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Look up an import by alias, ignoring case.
    pub fn import(&self, alias: &str) -> Option<&str> {
        let lowered = alias.to_lowercase();
        self.imports
            .iter()
            .find(|(key, _)| key.to_lowercase() == lowered)
            .map(|(_, fqn)| fqn.as_str())
    }

    /// The current namespace, if declared through the `__NAMESPACE__` import.
    pub fn current_namespace(&self) -> Option<&str> {
        self.import(NAMESPACE_IMPORT)
    }

    /// True when `name` is covered by an ignore rule.
    pub fn is_ignored(&self, name: &str) -> bool {
        if self.ignore_not_imported_annotations || self.ignored_annotation_names.contains(name) {
            return true;
        }
        let candidate = format!("{}\\", name.trim_end_matches('\\')).to_lowercase();
        self.ignored_annotation_namespaces.iter().any(|namespace| {
            let prefix = format!("{}\\", namespace.trim_end_matches('\\')).to_lowercase();
            candidate.starts_with(&prefix)
        })
    }
}
