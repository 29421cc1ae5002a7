// src/core/errors.rs

use crate::{constants::HELP_COMMAND, core::paths::PathError};
use std::path::PathBuf;
use thiserror::Error;

/// Every failure the framework can raise, from declaration time through
/// command execution. The lifecycle runner is the single place where these
/// are reported and turned into an exit code.
#[derive(Error, Debug)]
pub enum CliError {
    /// A declared name or alias is already taken in the same scope.
    #[error("'{name}' is already declared in {scope}")]
    NameCollision {
        /// Where the clash happened (`global options`, `command 'push'`).
        scope: String,
        /// The name that was already taken.
        name: String,
    },

    /// A declared name is empty or contains characters not allowed in options.
    #[error("'{0}' is not a valid option or command name")]
    InvalidName(String),

    /// An option-shaped token before the command that no global option answers to.
    #[error("Unknown global option '{0}'")]
    UnknownGlobalOption(String),

    /// The command name matches no command or alias.
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// An unrecognized option while scanning the options of `command`.
    #[error("Unknown option '{argument}' for command '{command}'")]
    UnknownCommandArgument {
        /// The token as typed.
        argument: String,
        /// Canonical name of the command being parsed.
        command: String,
    },

    /// A flag was the last token and had no value to consume.
    #[error("Option '{0}' requires an argument")]
    MissingArgument(String),

    /// A command body or hook asked to stop with a specific exit code.
    #[error("{message}")]
    CustomExit {
        /// Reported as `error: <message>`; nothing is printed when empty.
        message: String,
        /// The process exit code.
        code: i32,
    },

    /// The configuration file exists but could not be read or parsed.
    #[error("Could not read configuration file '{path}': {reason}")]
    ConfigLoad {
        /// The resolved file path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The configuration file could not be written.
    #[error("Could not write configuration file '{path}': {reason}")]
    ConfigWrite {
        /// The resolved file path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// `initconfig` found a file in place and was not given `--force`.
    #[error("Not overwriting existing configuration file '{0}'; use --force to replace it")]
    ConfigExists(PathBuf),

    /// The configuration path could not be resolved.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Any other failure raised by a command body or hook.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Builds a `CustomExit` failure.
    pub fn exit(message: impl Into<String>, code: i32) -> Self {
        Self::CustomExit {
            message: message.into(),
            code,
        }
    }

    /// The explicit exit code carried by this failure, if any.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CustomExit { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// A follow-up line pointing the user at the relevant help, for the
    /// failures a user can fix by changing the command line.
    pub fn hint(&self, program: &str) -> Option<String> {
        match self {
            Self::UnknownGlobalOption(_) | Self::UnknownCommand(_) => Some(format!(
                "Run '{} {}' for a list of global options and commands.",
                program, HELP_COMMAND
            )),
            Self::UnknownCommandArgument { command, .. } => Some(format!(
                "Run '{} {} {}' for a list of command options.",
                program, HELP_COMMAND, command
            )),
            _ => None,
        }
    }

    /// Recovers a typed failure from an error returned by user code.
    pub(crate) fn from_anyhow(error: anyhow::Error) -> Self {
        match error.downcast::<Self>() {
            Ok(cli_error) => cli_error,
            Err(other) => Self::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_only_custom_exit_carries_an_exit_code() {
        assert_eq!(CliError::exit("stop", 3).exit_code(), Some(3));
        assert_eq!(CliError::UnknownCommand("x".into()).exit_code(), None);
        assert_eq!(CliError::Other(anyhow!("boom")).exit_code(), None);
    }

    #[test]
    fn test_hint_references_command_help() {
        let err = CliError::UnknownCommandArgument {
            argument: "--bogus".into(),
            command: "push".into(),
        };
        assert_eq!(
            err.hint("git").as_deref(),
            Some("Run 'git help push' for a list of command options.")
        );
        assert!(CliError::exit("stop", 1).hint("git").is_none());
    }

    #[test]
    fn test_from_anyhow_recovers_typed_failures() {
        let wrapped = anyhow::Error::new(CliError::exit("halt", 7));
        let recovered = CliError::from_anyhow(wrapped);
        assert!(matches!(recovered, CliError::CustomExit { code: 7, .. }));

        let plain = CliError::from_anyhow(anyhow!("disk full"));
        assert!(matches!(plain, CliError::Other(_)));
        assert_eq!(plain.to_string(), "disk full");
    }
}
