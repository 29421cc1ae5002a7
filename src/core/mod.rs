// src/core/mod.rs

pub mod arg_parser;
/// Commands and the command registry.
pub mod command;
pub mod config_loader;
/// The failure type shared by declaration, parsing and execution.
pub mod errors;
/// Resolved option values handed to hooks and command bodies.
pub mod options;
/// Location of the configuration file.
pub mod paths;
/// Switch and flag registries.
pub mod registry;
