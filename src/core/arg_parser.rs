// src/core/arg_parser.rs

//! # Argument Parser
//!
//! Splits a raw command line into global options, a command, command options
//! and positional arguments in two phases:
//!
//! 1. **Global scan:** recognized global switches and flags are consumed from
//!    the front until the first token that is not one of them. That token is
//!    the command name. Anything after it is left for phase 2, even tokens
//!    that look like options.
//! 2. **Command scan:** the resolved command's own options are recognized
//!    anywhere in the remaining tokens; everything else is a positional
//!    argument, kept in its original order.
//!
//! Options are matched by exact name: one-character names as `-x`, longer
//! names as `--name` (or `--name=value` for flags). A flag consumes the next
//! token as its value whatever its shape. `--` ends option scanning.

use crate::{
    constants::{END_OF_OPTIONS, NEGATION_PREFIX},
    core::{
        command::{Command, CommandRegistry},
        errors::CliError,
        options::Options,
        registry::TokenRegistry,
    },
    models::{OptionValue, Token},
};

/// The result of a successful parse, before alias propagation.
#[derive(Debug)]
pub struct ParsedInvocation<'r> {
    /// Global options, with effective defaults filled in.
    pub global: Options,
    /// The command the invocation resolved to.
    pub command: &'r Command,
    /// The command's options, with effective defaults filled in.
    pub options: Options,
    /// Positional arguments in their original relative order.
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    /// Stop at the first positional token (global options).
    StopAtPositional,
    /// Collect positionals and keep scanning (command options).
    Permute,
}

#[derive(Debug)]
enum ScanError {
    Unrecognized(String),
    MissingArgument(String),
}

#[derive(Debug)]
struct Scan<'a> {
    options: Options,
    positional: Vec<&'a str>,
    /// Unscanned tokens; only non-empty when a `StopAtPositional` scan stops early.
    rest: &'a [String],
}

/// How a single command-line token matched a registry entry.
enum Match<'r, 'a> {
    /// `-x`, `--name` or `--name=value`.
    Direct(&'r Token, Option<&'a str>),
    /// `--no-name` on a negatable switch.
    Negated(&'r Token),
}

/// Parses `args` (the command line without the program name).
///
/// `default_command` is used when no command name is present. Fails with
/// `UnknownGlobalOption` before the command name is even looked at, with
/// `UnknownCommand` if the name resolves to nothing, and with
/// `UnknownCommandArgument` for unknown options after the command name.
pub fn parse<'r>(
    globals: &TokenRegistry,
    commands: &'r CommandRegistry,
    default_command: &str,
    args: &[String],
) -> Result<ParsedInvocation<'r>, CliError> {
    // --- Phase 1: global options ---
    let global_scan =
        scan(globals, args, ScanMode::StopAtPositional).map_err(|err| match err {
            ScanError::Unrecognized(arg) => CliError::UnknownGlobalOption(arg),
            ScanError::MissingArgument(arg) => CliError::MissingArgument(arg),
        })?;
    let mut global = global_scan.options;
    global.fill_defaults(globals);

    // --- Command resolution ---
    let (command_name, command_args) = match global_scan.rest.split_first() {
        Some((name, rest)) => (name.as_str(), rest),
        None => (default_command, &[][..]),
    };
    let command = commands
        .find(command_name)
        .ok_or_else(|| CliError::UnknownCommand(command_name.to_string()))?;
    log::debug!("Resolved command '{}' from '{}'", command.name(), command_name);

    // --- Phase 2: command options and positionals ---
    let command_scan =
        scan(command.options(), command_args, ScanMode::Permute).map_err(|err| match err {
            ScanError::Unrecognized(arg) => CliError::UnknownCommandArgument {
                argument: arg,
                command: command.name().to_string(),
            },
            ScanError::MissingArgument(arg) => CliError::MissingArgument(arg),
        })?;
    let mut options = command_scan.options;
    options.fill_defaults(command.options());

    Ok(ParsedInvocation {
        global,
        command,
        options,
        args: command_scan
            .positional
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

/// Scans `args` against `registry`, storing values under canonical names.
fn scan<'a>(
    registry: &TokenRegistry,
    args: &'a [String],
    mode: ScanMode,
) -> Result<Scan<'a>, ScanError> {
    let mut options = Options::default();
    let mut positional = Vec::new();
    let mut params_iter = args.iter();

    loop {
        let rest = params_iter.as_slice();
        let Some(param) = params_iter.next() else {
            break;
        };

        if param == END_OF_OPTIONS {
            match mode {
                ScanMode::StopAtPositional => {
                    return Ok(Scan {
                        options,
                        positional,
                        rest: params_iter.as_slice(),
                    });
                }
                ScanMode::Permute => {
                    positional.extend(params_iter.by_ref().map(String::as_str));
                    break;
                }
            }
        }

        if !is_option_shaped(param) {
            match mode {
                ScanMode::StopAtPositional => {
                    return Ok(Scan {
                        options,
                        positional,
                        rest,
                    });
                }
                ScanMode::Permute => {
                    positional.push(param.as_str());
                    continue;
                }
            }
        }

        match match_option(registry, param) {
            Some(Match::Negated(token)) => {
                options.set(token.name(), OptionValue::Switch(false));
            }
            Some(Match::Direct(token, inline)) if token.is_switch() => {
                if inline.is_some() {
                    // Switches take no value, `--force=yes` is not a known option.
                    return Err(ScanError::Unrecognized(param.clone()));
                }
                options.set(token.name(), OptionValue::Switch(true));
            }
            Some(Match::Direct(token, inline)) => {
                let value = match inline {
                    Some(value) => value,
                    None => params_iter
                        .next()
                        .map(String::as_str)
                        .ok_or_else(|| ScanError::MissingArgument(param.clone()))?,
                };
                options.set(token.name(), OptionValue::from(value));
            }
            None => return Err(ScanError::Unrecognized(param.clone())),
        }
    }

    Ok(Scan {
        options,
        positional,
        rest: &[],
    })
}

/// A lone `-` is a positional argument (conventionally stdin).
fn is_option_shaped(param: &str) -> bool {
    param.len() > 1 && param.starts_with('-')
}

fn match_option<'r, 'a>(registry: &'r TokenRegistry, param: &'a str) -> Option<Match<'r, 'a>> {
    if let Some(body) = param.strip_prefix("--") {
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        if name.chars().count() > 1
            && let Some(token) = registry.find(name)
        {
            return Some(Match::Direct(token, inline));
        }

        let negated = name.strip_prefix(NEGATION_PREFIX)?;
        if inline.is_some() {
            return None;
        }
        return registry
            .find(negated)
            .filter(|token| token.is_negatable())
            .map(Match::Negated);
    }

    let name = param.strip_prefix('-')?;
    if name.chars().count() != 1 {
        return None;
    }
    registry.find(name).map(|token| Match::Direct(token, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenKind;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn flag(registry: &mut TokenRegistry, names: &[&str], default: Option<&str>) {
        let token = registry
            .declare(
                names.iter().copied(),
                TokenKind::Flag {
                    arg_name: "ARG".to_string(),
                },
            )
            .unwrap();
        token.declared_default = default.map(OptionValue::from);
        token.effective_default = token.declared_default.clone();
    }

    fn switch(registry: &mut TokenRegistry, names: &[&str], negatable: bool) {
        registry
            .declare(names.iter().copied(), TokenKind::Switch { negatable })
            .unwrap();
    }

    fn fixture() -> (TokenRegistry, CommandRegistry) {
        let mut globals = TokenRegistry::new("global options");
        flag(&mut globals, &["file"], Some("a.txt"));
        switch(&mut globals, &["v", "verbose"], false);

        let mut commands = CommandRegistry::default();
        commands.declare(["help"]).unwrap();
        commands.declare(["status", "st"]).unwrap();
        let push = commands.declare(["push"]).unwrap();
        switch(&mut push.options, &["force"], true);
        flag(&mut push.options, &["r", "remote"], Some("origin"));

        (globals, commands)
    }

    #[test]
    fn test_global_flag_default_is_filled() {
        let (globals, commands) = fixture();
        let parsed = parse(&globals, &commands, "help", &args(&["status"])).unwrap();

        assert_eq!(parsed.command.name(), "status");
        assert_eq!(parsed.global.text("file"), Some("a.txt"));
        assert!(!parsed.global.contains("v"));
        assert!(parsed.args.is_empty());
    }

    #[test]
    fn test_explicit_global_flag_wins() {
        let (globals, commands) = fixture();
        let parsed = parse(
            &globals,
            &commands,
            "help",
            &args(&["-v", "--file", "c.txt", "st"]),
        )
        .unwrap();

        assert_eq!(parsed.command.name(), "status");
        assert_eq!(parsed.global.text("file"), Some("c.txt"));
        assert!(parsed.global.is_on("v"));
    }

    #[test]
    fn test_unknown_global_option_stops_before_command_lookup() {
        let (globals, commands) = fixture();
        // "nope" is not a command either, but the option error comes first.
        let result = parse(&globals, &commands, "help", &args(&["-x", "nope"]));
        assert!(matches!(result, Err(CliError::UnknownGlobalOption(ref a)) if a == "-x"));
    }

    #[test]
    fn test_unknown_command() {
        let (globals, commands) = fixture();
        let result = parse(&globals, &commands, "help", &args(&["-v", "nope"]));
        assert!(matches!(result, Err(CliError::UnknownCommand(ref c)) if c == "nope"));
    }

    #[test]
    fn test_missing_command_uses_default() {
        let (globals, commands) = fixture();
        let parsed = parse(&globals, &commands, "help", &args(&["--verbose"])).unwrap();
        assert_eq!(parsed.command.name(), "help");
        assert!(parsed.global.is_on("v"));
    }

    #[test]
    fn test_command_options_permute_with_positionals() {
        // --- Setup ---
        let (globals, commands) = fixture();

        // --- Execute ---
        let parsed = parse(
            &globals,
            &commands,
            "help",
            &args(&["push", "arg1", "--force", "arg2"]),
        )
        .unwrap();

        // --- Assert ---
        assert_eq!(parsed.command.name(), "push");
        assert!(parsed.options.is_on("force"));
        assert_eq!(parsed.options.text("r"), Some("origin"));
        assert_eq!(parsed.args, vec!["arg1", "arg2"]);
    }

    #[test]
    fn test_global_looking_options_after_command_belong_to_the_command() {
        let (globals, commands) = fixture();
        let result = parse(&globals, &commands, "help", &args(&["push", "-v"]));
        assert!(matches!(
            result,
            Err(CliError::UnknownCommandArgument { ref argument, ref command })
                if argument == "-v" && command == "push"
        ));
    }

    #[test]
    fn test_flag_consumes_next_token_whatever_its_shape() {
        let (globals, commands) = fixture();
        let parsed = parse(
            &globals,
            &commands,
            "help",
            &args(&["--file", "-v", "push", "-r", "--force"]),
        )
        .unwrap();

        assert_eq!(parsed.global.text("file"), Some("-v"));
        assert!(!parsed.global.contains("v"));
        assert_eq!(parsed.options.text("r"), Some("--force"));
        assert!(!parsed.options.contains("force"));
    }

    #[test]
    fn test_flag_without_value_is_missing_argument() {
        let (globals, commands) = fixture();
        let result = parse(&globals, &commands, "help", &args(&["push", "--remote"]));
        assert!(matches!(result, Err(CliError::MissingArgument(ref a)) if a == "--remote"));
    }

    #[test]
    fn test_inline_values_and_negation() {
        let (globals, commands) = fixture();
        let parsed = parse(
            &globals,
            &commands,
            "help",
            &args(&["--file=b.txt", "push", "--no-force", "--remote=up"]),
        )
        .unwrap();

        assert_eq!(parsed.global.text("file"), Some("b.txt"));
        assert_eq!(parsed.options.get("force"), Some(&OptionValue::Switch(false)));
        assert_eq!(parsed.options.text("r"), Some("up"));
    }

    #[test]
    fn test_names_only_match_in_their_own_form() {
        let (globals, commands) = fixture();
        // "v" is a one-character name, so "--v" is not a rendering of it.
        let result = parse(&globals, &commands, "help", &args(&["--v", "status"]));
        assert!(matches!(result, Err(CliError::UnknownGlobalOption(_))));

        // "file" is long, so "-file" is not a rendering of it.
        let result = parse(&globals, &commands, "help", &args(&["-file", "status"]));
        assert!(matches!(result, Err(CliError::UnknownGlobalOption(_))));
    }

    #[test]
    fn test_end_of_options_marker() {
        let (globals, commands) = fixture();
        let parsed = parse(
            &globals,
            &commands,
            "help",
            &args(&["-v", "--", "push", "a", "--", "--force", "-"]),
        )
        .unwrap();

        assert_eq!(parsed.command.name(), "push");
        assert!(!parsed.options.contains("force"));
        assert_eq!(parsed.args, vec!["a", "--force", "-"]);
    }
}
