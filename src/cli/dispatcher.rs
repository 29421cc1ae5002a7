//! # Lifecycle runner
//!
//! One invocation walks these stages in order:
//!
//! ```text
//! config load -> default overlay -> parse -> alias propagation
//!     -> pre-hook -> command -> post-hook
//! ```
//!
//! Any stage may fail. The first failure skips the remaining stages and is
//! handed to `App::handle_failure`, which reports it and picks the exit code.

use crate::{
    cli::{App, handlers},
    constants::{
        DEBUG_ENV_VAR, GENERIC_EXIT_CODE, HELP_COMMAND, INIT_CONFIG_COMMAND, VERSION_SWITCH,
    },
    core::{
        arg_parser::{self, ParsedInvocation},
        command::Action,
        config_loader::ConfigOverlay,
        errors::CliError,
    },
    models::Outcome,
};
use colored::Colorize;
use std::{collections::HashMap, env, io::Write};

impl App {
    /// Runs the program against `args` (without the program name), loading
    /// the configuration file first if one was declared.
    ///
    /// Returns the exit code. When `GANTRY_DEBUG` is set, a failure is
    /// reported as usual and then returned as `Err` instead.
    pub fn run<I, S>(&mut self, args: I) -> Result<i32, CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let result = match self.load_config() {
            Ok(overlay) => self.execute(&args, &overlay),
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    /// Like [`App::run`], but with an already loaded configuration overlay.
    pub fn run_with_config<I, S>(
        &mut self,
        args: I,
        overlay: &ConfigOverlay,
    ) -> Result<i32, CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let result = self.execute(&args, overlay);
        self.finish(result)
    }

    /// Makes configuration values the effective defaults of every global and
    /// command option. Safe to call more than once; the last overlay wins
    /// and declared defaults return for keys it does not mention.
    ///
    /// The `--version` switch only counts on the command line, so a
    /// configured value for it is ignored.
    pub fn apply_config_defaults(&mut self, overlay: &ConfigOverlay) {
        log::debug!("Applying config overlay to option defaults");
        if self.version.is_some() && overlay.globals.contains_key(VERSION_SWITCH) {
            log::warn!(
                "Ignoring '{}' in the configuration; it only works on the command line",
                VERSION_SWITCH
            );
            let mut globals = overlay.globals.clone();
            globals.remove(VERSION_SWITCH);
            self.globals.apply_defaults(&globals);
        } else {
            self.globals.apply_defaults(&overlay.globals);
        }

        let empty = HashMap::new();
        for command in self.commands.iter_mut() {
            let values = overlay.command(&command.name).unwrap_or(&empty);
            command.options.apply_defaults(values);
        }
    }

    fn load_config(&self) -> Result<ConfigOverlay, CliError> {
        match self.config_path()? {
            Some(path) => ConfigOverlay::load(&path),
            None => Ok(ConfigOverlay::default()),
        }
    }

    fn finish(&mut self, result: Result<i32, CliError>) -> Result<i32, CliError> {
        match result {
            Ok(code) => Ok(code),
            Err(e) => self.handle_failure(e, debug_requested()),
        }
    }

    /// Registers the built-in commands the program did not declare itself.
    fn ensure_builtins(&mut self) -> Result<(), CliError> {
        if self.commands.find(HELP_COMMAND).is_none() {
            let mut help = self.command([HELP_COMMAND])?;
            help.desc("Shows a list of commands or help for one command")
                .arg_name("command")
                .skips_pre(true)
                .skips_post(true)
                .builtin(Action::Help);
            help.switch(["json"])?
                .desc("Print the option and command registry as JSON");
        }

        if self.config_file.is_some() && self.commands.find(INIT_CONFIG_COMMAND).is_none() {
            let mut init = self.command([INIT_CONFIG_COMMAND])?;
            init.desc("Initialize the config file using current global options")
                .long_desc(
                    "Writes the global options given before this command, and the \
                     current defaults of every command option, to the config file.",
                )
                .skips_pre(true)
                .skips_post(true)
                .builtin(Action::InitConfig);
            init.switch(["force"])?
                .desc("Force overwrite of an existing config file");
        }
        Ok(())
    }

    fn execute(&mut self, args: &[String], overlay: &ConfigOverlay) -> Result<i32, CliError> {
        log::debug!("Running '{}' with args: {:?}", self.program, args);
        self.ensure_builtins()?;
        self.apply_config_defaults(overlay);

        let ParsedInvocation {
            mut global,
            command,
            mut options,
            args,
        } = arg_parser::parse(&self.globals, &self.commands, &self.default_command, args)?;

        global.propagate_aliases(&self.globals);
        options.propagate_aliases(command.options());
        log::debug!(
            "Parsed invocation: command='{}', global={:?}, options={:?}, args={:?}",
            command.name(),
            global,
            options,
            args
        );

        if self.version.is_some() && global.is_on(VERSION_SWITCH) {
            println!(
                "{} version {}",
                self.program,
                self.version.as_deref().unwrap_or_default()
            );
            return Ok(0);
        }

        // --- Pre-hook ---
        if command.skips_pre() {
            log::trace!("Command '{}' skips the pre-hook", command.name());
        } else if let Some(pre) = &self.pre {
            let proceed = pre(&global, command, &options, args.as_slice())
                .map_err(CliError::from_anyhow)?;
            if !proceed {
                log::debug!("Pre-hook stopped command '{}'", command.name());
                return Ok(0);
            }
        }

        // --- Command ---
        let outcome = match &command.action {
            Action::Body(body) => {
                body(&global, &options, args.as_slice()).map_err(CliError::from_anyhow)?
            }
            Action::Help => handlers::help::handle(self, &options, &args)?,
            Action::InitConfig => handlers::init_config::handle(self, &global, &options)?,
            Action::Missing => {
                return Err(CliError::Other(anyhow::anyhow!(
                    "Command '{}' has no action",
                    command.name()
                )));
            }
        };

        if let Outcome::Exit { code, message } = outcome {
            log::debug!("Command '{}' exited with code {}", command.name(), code);
            return Err(CliError::CustomExit {
                message: message.unwrap_or_default(),
                code,
            });
        }

        // --- Post-hook ---
        if command.skips_post() {
            log::trace!("Command '{}' skips the post-hook", command.name());
        } else if let Some(post) = &self.post {
            post(&global, command, &options, args.as_slice()).map_err(CliError::from_anyhow)?;
        }

        Ok(0)
    }

    /// Reports `failure` and derives the exit code.
    ///
    /// The error hook runs first; unless it returns `false`, the failure is
    /// written to the error output as `error: <message>` plus a hint line
    /// when one applies. A `CustomExit` with an empty message prints nothing.
    /// With `reraise`, the failure comes back as `Err` after being reported.
    pub(crate) fn handle_failure(
        &mut self,
        failure: CliError,
        reraise: bool,
    ) -> Result<i32, CliError> {
        log::debug!("Handling failure: {:?}", failure);

        let report = match &self.on_error {
            Some(hook) => hook(&failure),
            None => true,
        };
        let silent_exit =
            matches!(&failure, CliError::CustomExit { message, .. } if message.is_empty());

        if report && !silent_exit {
            let mut lines = format!("{}: {}\n", "error".red().bold(), failure);
            if let Some(hint) = failure.hint(&self.program) {
                lines.push_str(&hint);
                lines.push('\n');
            }
            if let Err(e) = self.error_output.write_all(lines.as_bytes()) {
                log::warn!("Could not write failure message: {}", e);
            }
        }

        if reraise {
            return Err(failure);
        }
        Ok(failure.exit_code().unwrap_or(GENERIC_EXIT_CODE))
    }
}

fn debug_requested() -> bool {
    debug_requested_from(env::var(DEBUG_ENV_VAR).ok().as_deref())
}

/// Any non-empty value other than `0` or `false` turns the toggle on.
fn debug_requested_from(value: Option<&str>) -> bool {
    value.is_some_and(|value| {
        !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
    })
}
