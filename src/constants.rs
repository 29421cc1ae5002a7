// src/constants.rs

/// The reserved name of the built-in help command. Also the command used
/// when no command name is given on the command line.
pub const HELP_COMMAND: &str = "help";

/// The name of the built-in command that writes the configuration file.
pub const INIT_CONFIG_COMMAND: &str = "initconfig";

/// The key under which per-command values live in a configuration file.
pub const COMMANDS_CONFIG_KEY: &str = "commands";

/// The name of the global switch declared by `App::version`.
pub const VERSION_SWITCH: &str = "version";

/// Exit code used for failures that do not carry their own.
pub const GENERIC_EXIT_CODE: i32 = -2;

/// When set, failures are handed back to the caller after being reported.
pub const DEBUG_ENV_VAR: &str = "GANTRY_DEBUG";

/// Placeholder shown in help output for flags declared without one.
pub const DEFAULT_ARG_NAME: &str = "arg";

/// Marks the end of option scanning on the command line.
pub const END_OF_OPTIONS: &str = "--";

/// Prefix accepted before a negatable switch name (`--no-force`).
pub const NEGATION_PREFIX: &str = "no-";
