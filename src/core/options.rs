// src/core/options.rs

use crate::{core::registry::TokenRegistry, models::OptionValue};
use serde::Serialize;
use std::collections::HashMap;

/// The options resolved for one invocation, keyed by every declared name.
///
/// After alias propagation a value can be read under the canonical name or
/// any alias. Options that were neither given nor defaulted are absent.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Options {
    values: HashMap<String, OptionValue>,
}

impl Options {
    /// The raw value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// The text of a flag stored under `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    /// Whether the switch stored under `name` is on. Absent means off.
    pub fn is_on(&self, name: &str) -> bool {
        self.get(name).is_some_and(OptionValue::is_on)
    }

    /// Whether any value, including a default, exists under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Every resolved name and value, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of resolved names, aliases included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn set(&mut self, name: impl Into<String>, value: OptionValue) {
        self.values.insert(name.into(), value);
    }

    /// Gives every token without an explicit value its effective default.
    pub(crate) fn fill_defaults(&mut self, registry: &TokenRegistry) {
        for token in registry {
            if self.values.contains_key(token.name()) {
                continue;
            }
            if let Some(default) = token.default_value() {
                log::trace!("Defaulting '{}' to {}", token.name(), default);
                self.values.insert(token.name().to_string(), default.clone());
            }
        }
    }

    /// Copies each canonical value to every alias of its token.
    ///
    /// Must run after `fill_defaults` so defaulted values are visible
    /// under aliases too.
    pub(crate) fn propagate_aliases(&mut self, registry: &TokenRegistry) {
        for token in registry {
            let Some(value) = self.values.get(token.name()).cloned() else {
                continue;
            };
            for alias in token.aliases() {
                self.values.insert(alias.clone(), value.clone());
            }
        }
    }
}

impl<'a> IntoIterator for &'a Options {
    type Item = (&'a String, &'a OptionValue);
    type IntoIter = std::collections::hash_map::Iter<'a, String, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenKind;

    fn registry() -> TokenRegistry {
        let mut registry = TokenRegistry::new("global options");
        let file = registry
            .declare(
                ["f", "file"],
                TokenKind::Flag {
                    arg_name: "FILE".to_string(),
                },
            )
            .unwrap();
        file.declared_default = Some(OptionValue::from("a.txt"));
        file.effective_default = Some(OptionValue::from("a.txt"));
        registry
            .declare(["q", "quiet"], TokenKind::Switch { negatable: false })
            .unwrap();
        registry
    }

    #[test]
    fn test_explicit_value_propagates_to_aliases() {
        // --- Setup ---
        let registry = registry();
        let mut options = Options::default();
        options.set("f", OptionValue::from("x"));

        // --- Execute ---
        options.fill_defaults(&registry);
        options.propagate_aliases(&registry);

        // --- Assert ---
        assert_eq!(options.text("f"), Some("x"));
        assert_eq!(options.text("file"), Some("x"));
        assert!(!options.contains("q"));
        assert!(!options.is_on("quiet"));
    }

    #[test]
    fn test_defaults_are_visible_under_aliases() {
        let registry = registry();
        let mut options = Options::default();
        options.set("q", OptionValue::Switch(true));

        options.fill_defaults(&registry);
        options.propagate_aliases(&registry);

        assert_eq!(options.text("file"), Some("a.txt"));
        assert!(options.is_on("quiet"));
        assert_eq!(options.len(), 4);
    }
}
