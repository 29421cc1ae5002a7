// src/models.rs

use serde::{Deserialize, Serialize};
use std::fmt;

// --- OPTION VALUES ---

/// The value an option resolves to, either from the command line, the
/// configuration file or a declared default.
///
/// Switches resolve to `Switch(true)` when present. A negated switch
/// (`--no-force`) or a configuration value of `false` yields `Switch(false)`,
/// which is still distinguishable from an absent option.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum OptionValue {
    /// The value of a switch.
    Switch(bool),
    /// The value of a flag.
    Text(String),
}

impl OptionValue {
    /// Returns the text of a flag value, or `None` for switch values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Switch(_) => None,
        }
    }

    /// Returns `true` only for a switch that is on.
    pub fn is_on(&self) -> bool {
        matches!(self, Self::Switch(true))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Switch(value)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Switch(on) => write!(f, "{}", on),
            Self::Text(text) => f.write_str(text),
        }
    }
}

// --- TOKENS ---

/// Distinguishes switches (presence only) from flags (take a value).
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenKind {
    /// A boolean option. Negatable switches also accept `--no-<name>`.
    Switch {
        /// Whether `--no-<name>` turns the switch off.
        negatable: bool,
    },
    /// An option that consumes the next command-line token as its value.
    Flag {
        /// Placeholder for the value in help output.
        arg_name: String,
    },
}

/// A declared switch or flag.
///
/// The first declared name is canonical; the rest are aliases. The token
/// keeps its declared default apart from the effective default so that a
/// configuration overlay can be applied any number of times.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Token {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) long_description: Option<String>,
    #[serde(flatten)]
    pub(crate) kind: TokenKind,
    #[serde(skip)]
    pub(crate) declared_default: Option<OptionValue>,
    #[serde(rename = "default")]
    pub(crate) effective_default: Option<OptionValue>,
}

impl Token {
    /// Builds a token from already validated names. Returns `None` when
    /// `names` is empty.
    pub(crate) fn new(names: Vec<String>, kind: TokenKind) -> Option<Self> {
        let mut names = names.into_iter();
        let name = names.next()?;
        Some(Self {
            name,
            aliases: names.collect(),
            description: None,
            long_description: None,
            kind,
            declared_default: None,
            effective_default: None,
        })
    }

    /// The canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Secondary names, in declaration order.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The canonical name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether `name` is the canonical name or one of the aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// The one-line description shown in help output.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The extended description shown in command help.
    pub fn long_description(&self) -> Option<&str> {
        self.long_description.as_deref()
    }

    /// Whether this token is a switch or a flag.
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Returns `true` for switches.
    pub fn is_switch(&self) -> bool {
        matches!(self.kind, TokenKind::Switch { .. })
    }

    /// Returns `true` for switches declared as negatable.
    pub fn is_negatable(&self) -> bool {
        matches!(self.kind, TokenKind::Switch { negatable: true })
    }

    /// The value placeholder of a flag (`FILE` in `--file FILE`).
    pub fn arg_name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Flag { arg_name } => Some(arg_name),
            TokenKind::Switch { .. } => None,
        }
    }

    /// The default as declared, before any configuration overlay.
    pub fn declared_default(&self) -> Option<&OptionValue> {
        self.declared_default.as_ref()
    }

    /// The effective default: configuration value if any, else the declared one.
    pub fn default_value(&self) -> Option<&OptionValue> {
        self.effective_default.as_ref()
    }

    /// Every name in its command-line form (`-f`, `--file`).
    pub fn rendered_names(&self) -> Vec<String> {
        self.names().map(render_name).collect()
    }
}

/// Renders an option name the way it is typed: `-x` for one-character
/// names, `--name` otherwise.
pub fn render_name(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{}", name)
    } else {
        format!("--{}", name)
    }
}

// --- COMMAND OUTCOMES ---

/// What a command body reports back to the lifecycle runner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    /// The command finished normally; the post-hook runs and the exit code is 0.
    #[default]
    Success,
    /// The command asks to stop with a specific exit code. The post-hook is
    /// skipped and the message, if any, is reported like a failure.
    Exit {
        /// The process exit code.
        code: i32,
        /// Printed as `error: <message>` unless absent or empty.
        message: Option<String>,
    },
}

impl Outcome {
    /// Shorthand for `Outcome::Exit` with a message.
    pub fn exit(code: i32, message: impl Into<String>) -> Self {
        Self::Exit {
            code,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_name_by_length() {
        assert_eq!(render_name("f"), "-f");
        assert_eq!(render_name("file"), "--file");
    }

    #[test]
    fn test_token_names_put_canonical_first() {
        let token = Token::new(
            vec!["f".to_string(), "file".to_string()],
            TokenKind::Flag {
                arg_name: "FILE".to_string(),
            },
        )
        .unwrap();

        assert_eq!(token.name(), "f");
        assert_eq!(token.aliases(), &["file".to_string()]);
        assert!(token.answers_to("file"));
        assert!(!token.answers_to("-f"));
        assert_eq!(token.rendered_names(), vec!["-f", "--file"]);
        assert_eq!(token.arg_name(), Some("FILE"));
    }

    #[test]
    fn test_switch_value_is_distinguishable_from_flag_text() {
        let on = OptionValue::from(true);
        let off = OptionValue::from(false);
        let text = OptionValue::from("true");

        assert!(on.is_on());
        assert!(!off.is_on());
        assert!(!text.is_on());
        assert_eq!(text.as_str(), Some("true"));
        assert_eq!(on.as_str(), None);
    }
}
