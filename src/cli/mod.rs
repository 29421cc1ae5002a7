//! # Declaring a program
//!
//! An [`App`] owns everything a program declares: global switches and flags,
//! commands with their own options, and lifecycle hooks. Nothing is global,
//! so several independent programs can live in one process.
//!
//! ```no_run
//! use gantry::{App, Outcome};
//!
//! # fn main() -> Result<(), gantry::CliError> {
//! let mut app = App::new("git-lite");
//! app.flag(["f", "file"])?.desc("Repository file").default_value("repo.txt");
//!
//! let mut push = app.command(["push"])?;
//! push.desc("Push changes");
//! push.switch(["force"])?.desc("Overwrite the remote");
//! push.action(|global, options, args| {
//!     println!("{:?} {} {:?}", global.text("file"), options.is_on("force"), args);
//!     Ok(Outcome::Success)
//! });
//!
//! let code = app.run(std::env::args().skip(1))?;
//! std::process::exit(code);
//! # }
//! ```

pub mod dispatcher;
pub mod handlers;

use crate::{
    constants::{DEFAULT_ARG_NAME, HELP_COMMAND, NEGATION_PREFIX, VERSION_SWITCH},
    core::{
        command::{Action, Command, CommandRegistry},
        errors::CliError,
        options::Options,
        paths,
        registry::TokenRegistry,
    },
    models::{OptionValue, Outcome, Token, TokenKind},
};
use std::{
    fmt,
    io::{self, Write},
    path::PathBuf,
};

/// Runs before the command body. Returning `false` stops the invocation
/// quietly with exit code 0.
pub type PreHook = Box<dyn Fn(&Options, &Command, &Options, &[String]) -> anyhow::Result<bool>>;

/// Runs after a command body that finished with `Outcome::Success`.
pub type PostHook = Box<dyn Fn(&Options, &Command, &Options, &[String]) -> anyhow::Result<()>>;

/// Sees every failure first. Returning `false` suppresses the built-in
/// error message; the exit code is unaffected.
pub type ErrorHook = Box<dyn Fn(&CliError) -> bool>;

/// The definition of a command-line program and its lifecycle runner.
pub struct App {
    pub(crate) program: String,
    pub(crate) description: Option<String>,
    pub(crate) long_description: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) config_file: Option<String>,
    pub(crate) default_command: String,
    pub(crate) globals: TokenRegistry,
    pub(crate) commands: CommandRegistry,
    pub(crate) pre: Option<PreHook>,
    pub(crate) post: Option<PostHook>,
    pub(crate) on_error: Option<ErrorHook>,
    pub(crate) error_output: Box<dyn Write>,
}

impl App {
    /// Creates an empty program definition. `program` is the name used in
    /// usage lines and error hints.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            description: None,
            long_description: None,
            version: None,
            config_file: None,
            default_command: HELP_COMMAND.to_string(),
            globals: TokenRegistry::new("global options"),
            commands: CommandRegistry::default(),
            pre: None,
            post: None,
            on_error: None,
            error_output: Box::new(io::stderr()),
        }
    }

    // --- Program metadata ---

    /// One-line program description for help output.
    pub fn program_desc(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    /// Longer description shown under `DESCRIPTION` in help output.
    pub fn program_long_desc(&mut self, description: impl Into<String>) -> &mut Self {
        self.long_description = Some(description.into());
        self
    }

    /// Sets the program version and declares the global `--version` switch.
    pub fn version(&mut self, version: impl Into<String>) -> Result<&mut Self, CliError> {
        if self.version.is_none() {
            self.switch([VERSION_SWITCH])?
                .desc("Display the program version");
        }
        self.version = Some(version.into());
        Ok(self)
    }

    /// Declares where persisted option values live. See
    /// [`paths::resolve_config_path`] for how the path is interpreted.
    /// Also enables the built-in `initconfig` command.
    pub fn config_file(&mut self, path: impl Into<String>) -> &mut Self {
        self.config_file = Some(path.into());
        self
    }

    /// The command to run when none is named on the command line.
    pub fn default_command(&mut self, name: impl Into<String>) -> &mut Self {
        self.default_command = name.into();
        self
    }

    /// Redirects failure messages, which go to stderr by default.
    pub fn error_output(&mut self, output: impl Write + 'static) -> &mut Self {
        self.error_output = Box::new(output);
        self
    }

    // --- Declarations ---

    /// Declares a global switch. The first name is canonical.
    pub fn switch<I, S>(&mut self, names: I) -> Result<TokenBuilder<'_>, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TokenBuilder::declare(&mut self.globals, names, TokenKind::Switch { negatable: false })
    }

    /// Declares a global flag. The first name is canonical.
    pub fn flag<I, S>(&mut self, names: I) -> Result<TokenBuilder<'_>, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TokenBuilder::declare(&mut self.globals, names, default_flag_kind())
    }

    /// Declares a command. The first name is canonical.
    pub fn command<I, S>(&mut self, names: I) -> Result<CommandBuilder<'_>, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let command = self.commands.declare(names)?;
        Ok(CommandBuilder { command })
    }

    /// Sets the hook that runs before every command that does not skip it.
    pub fn pre<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Options, &Command, &Options, &[String]) -> anyhow::Result<bool> + 'static,
    {
        self.pre = Some(Box::new(hook));
        self
    }

    /// Sets the hook that runs after every successful command that does
    /// not skip it.
    pub fn post<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Options, &Command, &Options, &[String]) -> anyhow::Result<()> + 'static,
    {
        self.post = Some(Box::new(hook));
        self
    }

    /// Sets the hook that sees every failure before it is reported.
    pub fn on_error<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&CliError) -> bool + 'static,
    {
        self.on_error = Some(Box::new(hook));
        self
    }

    // --- Introspection ---

    /// The program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The one-line program description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The long program description.
    pub fn long_description(&self) -> Option<&str> {
        self.long_description.as_deref()
    }

    /// The version set with [`App::version`].
    pub fn version_text(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The global switches and flags, in declaration order.
    pub fn global_options(&self) -> &TokenRegistry {
        &self.globals
    }

    /// Every declared command, built-ins included once a run registered them.
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Looks a command up by name or alias.
    pub fn find_command(&self, name: &str) -> Option<&Command> {
        self.commands.find(name)
    }

    /// The resolved configuration file path, if one was declared.
    pub fn config_path(&self) -> Result<Option<PathBuf>, CliError> {
        match &self.config_file {
            Some(declared) => Ok(Some(paths::resolve_config_path(declared)?)),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("program", &self.program)
            .field("version", &self.version)
            .field("config_file", &self.config_file)
            .field("default_command", &self.default_command)
            .field("globals", &self.globals)
            .field("commands", &self.commands)
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

fn default_flag_kind() -> TokenKind {
    TokenKind::Flag {
        arg_name: DEFAULT_ARG_NAME.to_string(),
    }
}

/// Attaches metadata to a switch or flag right after it is declared.
#[derive(Debug)]
pub struct TokenBuilder<'a> {
    token: &'a mut Token,
    scope: String,
    // Names held by the other tokens of the registry at declaration time.
    neighbours: Vec<String>,
}

impl<'a> TokenBuilder<'a> {
    fn declare<I, S>(
        registry: &'a mut TokenRegistry,
        names: I,
        kind: TokenKind,
    ) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scope = registry.scope().to_string();
        let neighbours = registry.taken_names();
        let token = registry.declare(names, kind)?;
        Ok(Self {
            token,
            scope,
            neighbours,
        })
    }

    /// One-line description for help output.
    pub fn desc(self, description: impl Into<String>) -> Self {
        self.token.description = Some(description.into());
        self
    }

    /// Longer description for help output.
    pub fn long_desc(self, description: impl Into<String>) -> Self {
        self.token.long_description = Some(description.into());
        self
    }

    /// Sets the value placeholder shown in help. Ignored for switches.
    pub fn arg_name(self, name: impl Into<String>) -> Self {
        if let TokenKind::Flag { arg_name } = &mut self.token.kind {
            *arg_name = name.into();
        }
        self
    }

    /// Sets the declared default. Configuration values still override it.
    pub fn default_value(self, value: impl Into<OptionValue>) -> Self {
        let value = value.into();
        self.token.declared_default = Some(value.clone());
        self.token.effective_default = Some(value);
        self
    }

    /// Lets a switch also be turned off with `--no-<name>`. Ignored for flags.
    ///
    /// Fails with `NameCollision` when a `no-<name>` form is already a name
    /// in the same scope; the switch then stays declared, without negation.
    pub fn negatable(self) -> Result<Self, CliError> {
        if !self.token.is_switch() {
            return Ok(self);
        }
        let clash = self
            .token
            .names()
            .map(|name| format!("{}{}", NEGATION_PREFIX, name))
            .find(|negated| {
                self.neighbours.contains(negated) || self.token.answers_to(negated)
            });
        if let Some(name) = clash {
            return Err(CliError::NameCollision {
                scope: self.scope,
                name,
            });
        }

        if let TokenKind::Switch { negatable } = &mut self.token.kind {
            *negatable = true;
        }
        Ok(self)
    }
}

/// Attaches metadata, options and a body to a command after it is declared.
#[derive(Debug)]
pub struct CommandBuilder<'a> {
    command: &'a mut Command,
}

impl CommandBuilder<'_> {
    /// One-line description for help output.
    pub fn desc(&mut self, description: impl Into<String>) -> &mut Self {
        self.command.description = Some(description.into());
        self
    }

    /// Longer description for `help <command>`.
    pub fn long_desc(&mut self, description: impl Into<String>) -> &mut Self {
        self.command.long_description = Some(description.into());
        self
    }

    /// Sets the placeholder for positional arguments in usage lines.
    pub fn arg_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.command.arg_name = Some(name.into());
        self
    }

    /// Runs this command without the pre-hook.
    pub fn skips_pre(&mut self, skips: bool) -> &mut Self {
        self.command.skips_pre = skips;
        self
    }

    /// Runs this command without the post-hook.
    pub fn skips_post(&mut self, skips: bool) -> &mut Self {
        self.command.skips_post = skips;
        self
    }

    /// Declares a switch scoped to this command.
    pub fn switch<I, S>(&mut self, names: I) -> Result<TokenBuilder<'_>, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TokenBuilder::declare(
            &mut self.command.options,
            names,
            TokenKind::Switch { negatable: false },
        )
    }

    /// Declares a flag scoped to this command.
    pub fn flag<I, S>(&mut self, names: I) -> Result<TokenBuilder<'_>, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TokenBuilder::declare(&mut self.command.options, names, default_flag_kind())
    }

    /// Sets the command body.
    pub fn action<F>(&mut self, body: F) -> &mut Self
    where
        F: Fn(&Options, &Options, &[String]) -> anyhow::Result<Outcome> + 'static,
    {
        self.command.action = Action::Body(Box::new(body));
        self
    }

    pub(crate) fn builtin(&mut self, action: Action) -> &mut Self {
        self.command.action = action;
        self
    }
}
