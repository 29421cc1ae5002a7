// src/core/command.rs

use crate::{
    core::{
        errors::CliError,
        options::Options,
        registry::{TokenRegistry, normalize_names},
    },
    models::Outcome,
};
use std::fmt;

/// The body of a user-declared command. Receives the global options, the
/// command's own options and the positional arguments.
pub type CommandBody = Box<dyn Fn(&Options, &Options, &[String]) -> anyhow::Result<Outcome>>;

/// What the dispatcher runs once a command has been resolved.
pub(crate) enum Action {
    /// Declared without a body; running it is an error.
    Missing,
    Body(CommandBody),
    /// The built-in help command.
    Help,
    /// The built-in configuration writer.
    InitConfig,
}

/// A named unit of work with its own switches and flags.
pub struct Command {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) long_description: Option<String>,
    pub(crate) arg_name: Option<String>,
    pub(crate) options: TokenRegistry,
    pub(crate) skips_pre: bool,
    pub(crate) skips_post: bool,
    pub(crate) action: Action,
}

impl Command {
    fn new(names: Vec<String>) -> Option<Self> {
        let mut names = names.into_iter();
        let name = names.next()?;
        Some(Self {
            options: TokenRegistry::new(format!("command '{}'", name)),
            name,
            aliases: names.collect(),
            description: None,
            long_description: None,
            arg_name: None,
            skips_pre: false,
            skips_post: false,
            action: Action::Missing,
        })
    }

    /// The canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative names, in declaration order.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The canonical name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// One-line description for help output.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Longer description for `help <command>`.
    pub fn long_description(&self) -> Option<&str> {
        self.long_description.as_deref()
    }

    /// Placeholder for the positional arguments in usage lines.
    pub fn arg_name(&self) -> Option<&str> {
        self.arg_name.as_deref()
    }

    /// The command's own switches and flags.
    pub fn options(&self) -> &TokenRegistry {
        &self.options
    }

    /// Whether the pre-hook is bypassed for this command.
    pub fn skips_pre(&self) -> bool {
        self.skips_pre
    }

    /// Whether the post-hook is bypassed for this command.
    pub fn skips_post(&self) -> bool {
        self.skips_post
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.action {
            Action::Missing => "missing",
            Action::Body(_) => "body",
            Action::Help => "help",
            Action::InitConfig => "initconfig",
        };
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("options", &self.options)
            .field("skips_pre", &self.skips_pre)
            .field("skips_post", &self.skips_post)
            .field("action", &action)
            .finish()
    }
}

/// All declared commands, in declaration order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    const SCOPE: &'static str = "commands";

    /// Registers a command under `names`, the first one being canonical.
    /// Nothing is registered if any name is invalid or already taken.
    pub(crate) fn declare<I, S>(&mut self, names: I) -> Result<&mut Command, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = normalize_names(Self::SCOPE, names)?;
        if let Some(taken) = names.iter().find(|name| self.find(name).is_some()) {
            return Err(CliError::NameCollision {
                scope: Self::SCOPE.to_string(),
                name: taken.clone(),
            });
        }

        let command = Command::new(names).ok_or_else(|| CliError::InvalidName(String::new()))?;
        log::trace!("Declared command '{}'", command.name);
        self.commands.push(command);
        self.commands
            .last_mut()
            .ok_or_else(|| CliError::InvalidName(String::new()))
    }

    /// Finds a command by exact canonical name, then by alias. No prefix
    /// matching is attempted.
    pub fn find(&self, name: &str) -> Option<&Command> {
        self.commands
            .iter()
            .find(|cmd| cmd.name == name)
            .or_else(|| {
                self.commands
                    .iter()
                    .find(|cmd| cmd.aliases.iter().any(|alias| alias == name))
            })
    }

    /// Iterates over the commands in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Command> {
        self.commands.iter_mut()
    }

    /// Number of declared commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command has been declared.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
