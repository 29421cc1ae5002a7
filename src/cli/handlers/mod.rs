// src/cli/handlers/mod.rs

//! Bodies of the built-in commands. They read the same registry accessors
//! that are public to external renderers.

/// `help` and the help renderers.
pub mod help;
/// `initconfig`.
pub mod init_config;
