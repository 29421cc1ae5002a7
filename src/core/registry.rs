// src/core/registry.rs

use crate::{
    constants::NEGATION_PREFIX,
    core::errors::CliError,
    models::{OptionValue, Token, TokenKind},
};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref NAME_RE: Regex =
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("name pattern is a valid regex");
}

/// Normalizes a batch of declared names: leading dashes are stripped, each
/// name must match `NAME_RE`, and the batch may not repeat itself.
///
/// The whole batch is validated before the caller touches any registry, so
/// a failure never leaves a half-registered entry behind.
pub(crate) fn normalize_names<I, S>(scope: &str, names: I) -> Result<Vec<String>, CliError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for raw in names {
        let name = raw.as_ref().trim_start_matches('-');
        if !NAME_RE.is_match(name) {
            return Err(CliError::InvalidName(raw.as_ref().to_string()));
        }
        if normalized.iter().any(|n| n == name) {
            return Err(CliError::NameCollision {
                scope: scope.to_string(),
                name: name.to_string(),
            });
        }
        normalized.push(name.to_string());
    }

    if normalized.is_empty() {
        return Err(CliError::InvalidName(String::new()));
    }
    Ok(normalized)
}

/// An ordered set of switches and flags sharing one namespace.
///
/// Global options form one registry and every command owns another; the two
/// never see each other's names.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    scope: String,
    tokens: Vec<Token>,
}

impl TokenRegistry {
    /// Creates an empty registry. `scope` only appears in collision messages.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            tokens: Vec::new(),
        }
    }

    /// Registers a new token under `names`, the first one being canonical.
    ///
    /// Fails with `NameCollision` if any name is already used by a token of
    /// this registry, as a canonical name, as an alias, or as the `no-<name>`
    /// form of a negatable switch. Nothing is registered on failure.
    pub(crate) fn declare<I, S>(
        &mut self,
        names: I,
        kind: TokenKind,
    ) -> Result<&mut Token, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = normalize_names(&self.scope, names)?;
        let negatable = matches!(kind, TokenKind::Switch { negatable: true });
        if let Some(taken) = names.iter().find(|name| {
            self.find(name).is_some()
                || self.negates(name)
                || (negatable && self.find(&format!("{}{}", NEGATION_PREFIX, name)).is_some())
        }) {
            return Err(CliError::NameCollision {
                scope: self.scope.clone(),
                name: taken.clone(),
            });
        }

        let token = Token::new(names, kind).ok_or_else(|| CliError::InvalidName(String::new()))?;
        log::trace!("Declared '{}' in {}", token.name(), self.scope);
        self.tokens.push(token);
        self.tokens
            .last_mut()
            .ok_or_else(|| CliError::InvalidName(String::new()))
    }

    /// Finds a token by its canonical name or any alias.
    pub fn find(&self, name: &str) -> Option<&Token> {
        self.tokens.iter().find(|token| token.answers_to(name))
    }

    /// Iterates over the tokens in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// The scope label this registry reports in errors (`global options`,
    /// `command 'push'`).
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Whether `name` is `no-<x>` for a negatable switch `x` of this registry.
    pub(crate) fn negates(&self, name: &str) -> bool {
        name.strip_prefix(NEGATION_PREFIX)
            .and_then(|base| self.find(base))
            .is_some_and(Token::is_negatable)
    }

    /// Every name and alias taken in this registry.
    pub(crate) fn taken_names(&self) -> Vec<String> {
        self.tokens
            .iter()
            .flat_map(|token| token.names().map(str::to_string))
            .collect()
    }

    /// Number of declared tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Recomputes every token's effective default from `values`.
    ///
    /// A value is looked up under the canonical name first, then under each
    /// alias. Tokens with no configured value fall back to their declared
    /// default, which keeps this safe to call repeatedly. Values of the wrong
    /// shape are converted or, failing that, ignored.
    pub(crate) fn apply_defaults(&mut self, values: &HashMap<String, OptionValue>) {
        for token in &mut self.tokens {
            let configured = token
                .names()
                .find_map(|name| values.get(name))
                .and_then(|value| fit_to_kind(token, value, &self.scope));
            if let Some(value) = &configured {
                log::debug!(
                    "Config overrides default of '{}' in {}: {}",
                    token.name,
                    self.scope,
                    value
                );
            }
            token.effective_default = configured.or_else(|| token.declared_default.clone());
        }
    }
}

/// Converts a configured value to the shape `token` expects.
///
/// Switches accept booleans and the strings `true`, `false`, `1` and `0`.
/// Anything else is dropped with a warning. Flags take booleans as text.
fn fit_to_kind(token: &Token, value: &OptionValue, scope: &str) -> Option<OptionValue> {
    match (&token.kind, value) {
        (TokenKind::Switch { .. }, OptionValue::Text(text)) => {
            match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(OptionValue::Switch(true)),
                "false" | "0" => Some(OptionValue::Switch(false)),
                _ => {
                    log::warn!(
                        "Ignoring config value {:?} for switch '{}' in {}: expected true or false",
                        text,
                        token.name,
                        scope
                    );
                    None
                }
            }
        }
        (TokenKind::Flag { .. }, OptionValue::Switch(on)) => {
            Some(OptionValue::Text(on.to_string()))
        }
        _ => Some(value.clone()),
    }
}

impl<'a> IntoIterator for &'a TokenRegistry {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switch() -> TokenKind {
        TokenKind::Switch { negatable: false }
    }

    fn flag() -> TokenKind {
        TokenKind::Flag {
            arg_name: "ARG".to_string(),
        }
    }

    #[test]
    fn test_normalize_strips_dashes_and_rejects_garbage() {
        let names = normalize_names("test", ["--file", "-f"]).unwrap();
        assert_eq!(names, vec!["file", "f"]);

        assert!(matches!(
            normalize_names("test", ["--"]),
            Err(CliError::InvalidName(_))
        ));
        assert!(matches!(
            normalize_names("test", ["has space"]),
            Err(CliError::InvalidName(_))
        ));
        assert!(matches!(
            normalize_names("test", Vec::<String>::new()),
            Err(CliError::InvalidName(_))
        ));
    }

    #[test]
    fn test_declare_rejects_collision_with_alias() {
        // --- Setup ---
        let mut registry = TokenRegistry::new("global options");
        registry.declare(["v", "verbose"], switch()).unwrap();

        // --- Execute ---
        let result = registry.declare(["verbose"], flag());

        // --- Assert ---
        assert!(matches!(
            result,
            Err(CliError::NameCollision { ref name, .. }) if name == "verbose"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_collision_is_atomic() {
        // --- Setup ---
        let mut registry = TokenRegistry::new("global options");
        registry.declare(["file"], flag()).unwrap();

        // --- Execute ---
        // "out" is free, "file" is not: neither may be registered.
        let result = registry.declare(["out", "file"], flag());

        // --- Assert ---
        assert!(result.is_err());
        assert!(registry.find("out").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_inside_batch_is_a_collision() {
        let mut registry = TokenRegistry::new("global options");
        let result = registry.declare(["x", "-x"], switch());
        assert!(matches!(result, Err(CliError::NameCollision { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut registry = TokenRegistry::new("global options");
        registry.declare(["v"], switch()).unwrap();
        registry.declare(["V"], switch()).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_apply_defaults_precedence_and_idempotence() {
        // --- Setup ---
        let mut registry = TokenRegistry::new("global options");
        registry.declare(["file", "f"], flag()).unwrap().declared_default =
            Some(OptionValue::from("a.txt"));
        registry.declare(["level"], flag()).unwrap();
        for token in &mut registry.tokens {
            token.effective_default = token.declared_default.clone();
        }

        let mut config = HashMap::new();
        config.insert("f".to_string(), OptionValue::from("b.txt"));

        // --- Execute & Assert ---
        registry.apply_defaults(&config);
        registry.apply_defaults(&config);
        let file = registry.find("file").unwrap();
        assert_eq!(file.default_value(), Some(&OptionValue::from("b.txt")));
        assert_eq!(file.declared_default(), Some(&OptionValue::from("a.txt")));
        assert!(registry.find("level").unwrap().default_value().is_none());

        // An empty overlay restores the declared default.
        registry.apply_defaults(&HashMap::new());
        assert_eq!(
            registry.find("f").unwrap().default_value(),
            Some(&OptionValue::from("a.txt"))
        );
    }

    #[test]
    fn test_negated_form_of_a_negatable_switch_is_taken() {
        // --- Setup ---
        let mut registry = TokenRegistry::new("command 'push'");
        registry
            .declare(["force"], TokenKind::Switch { negatable: true })
            .unwrap();
        registry.declare(["no-verify"], switch()).unwrap();

        // --- Execute ---
        let shadowing = registry.declare(["no-force"], switch()).map(|_| ());
        let shadowed = registry
            .declare(["verify"], TokenKind::Switch { negatable: true })
            .map(|_| ());

        // --- Assert ---
        assert!(matches!(
            shadowing,
            Err(CliError::NameCollision { ref name, .. }) if name == "no-force"
        ));
        assert!(matches!(
            shadowed,
            Err(CliError::NameCollision { ref name, .. }) if name == "verify"
        ));
        assert_eq!(registry.len(), 2);

        // A plain switch leaves its "no-" form free.
        registry.declare(["dry-run"], switch()).unwrap();
        registry.declare(["no-dry-run"], switch()).unwrap();
    }

    #[test]
    fn test_apply_defaults_fits_values_to_the_token_kind() {
        // --- Setup ---
        let mut registry = TokenRegistry::new("command 'push'");
        registry.declare(["force"], switch()).unwrap();
        registry.declare(["quiet"], switch()).unwrap().declared_default =
            Some(OptionValue::Switch(true));
        registry.declare(["tag"], flag()).unwrap();

        let mut config = HashMap::new();
        config.insert("force".to_string(), OptionValue::from("true"));
        config.insert("quiet".to_string(), OptionValue::from("loud"));
        config.insert("tag".to_string(), OptionValue::Switch(false));

        // --- Execute ---
        registry.apply_defaults(&config);

        // --- Assert ---
        let default_of = |name: &str| registry.find(name).unwrap().default_value().cloned();
        assert_eq!(default_of("force"), Some(OptionValue::Switch(true)));
        // Unusable value: the declared default stays in effect.
        assert_eq!(default_of("quiet"), Some(OptionValue::Switch(true)));
        assert_eq!(default_of("tag"), Some(OptionValue::from("false")));
    }
}
