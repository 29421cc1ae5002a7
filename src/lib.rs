//! # gantry
//!
//! A framework for command-line programs shaped like
//! `prog [global options] command [command options] [arguments...]`.
//!
//! Declare global switches and flags, commands with their own options, and
//! hooks on an [`App`], then hand it the command line with [`App::run`].
//! Option defaults are layered: an explicit command-line value beats the
//! configuration file, which beats the declared default.

pub mod cli;
/// Reserved names and fixed values.
pub mod constants;
/// Registries, parsing, configuration and errors.
pub mod core;
/// Option values, tokens and command outcomes.
pub mod models;

pub use crate::cli::{App, CommandBuilder, TokenBuilder};
pub use crate::core::{
    command::Command, config_loader::ConfigOverlay, errors::CliError, options::Options,
};
pub use crate::models::{OptionValue, Outcome, Token, TokenKind};
