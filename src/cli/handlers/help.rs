// src/cli/handlers/help.rs

use crate::{
    cli::App,
    core::{command::Command, errors::CliError, options::Options, registry::TokenRegistry},
    models::{OptionValue, Outcome, Token, render_name},
};
use serde_json::{Value, json};
use std::fmt::Write;

/// Body of the built-in `help` command.
///
/// `help` prints the program overview, `help <command>` the usage of one
/// command, and `--json` prints the registry for external renderers.
pub(crate) fn handle(app: &App, options: &Options, args: &[String]) -> Result<Outcome, CliError> {
    let command = match args.first() {
        Some(name) => Some(
            app.find_command(name)
                .ok_or_else(|| CliError::UnknownCommand(name.clone()))?,
        ),
        None => None,
    };

    if options.is_on("json") {
        let value = match command {
            Some(command) => describe_command(command),
            None => describe_app(app),
        };
        let text = serde_json::to_string_pretty(&value).map_err(anyhow::Error::from)?;
        println!("{}", text);
        return Ok(Outcome::Success);
    }

    match command {
        Some(command) => print!("{}", render_command(app, command)),
        None => print!("{}", render_app(app)),
    }
    Ok(Outcome::Success)
}

/// Renders the program overview: synopsis, global options and commands.
pub fn render_app(app: &App) -> String {
    let mut out = String::new();

    section(&mut out, "NAME");
    match app.description() {
        Some(desc) => line(&mut out, &format!("{} - {}", app.program(), desc)),
        None => line(&mut out, app.program()),
    }

    section(&mut out, "SYNOPSIS");
    line(
        &mut out,
        &format!(
            "{} [global options] command [command options] [arguments...]",
            app.program()
        ),
    );

    if let Some(version) = app.version_text() {
        section(&mut out, "VERSION");
        line(&mut out, version);
    }

    if let Some(long) = app.long_description() {
        section(&mut out, "DESCRIPTION");
        line(&mut out, long);
    }

    if !app.global_options().is_empty() {
        section(&mut out, "GLOBAL OPTIONS");
        table(&mut out, option_rows(app.global_options()));
    }

    let mut commands: Vec<&Command> = app.commands().iter().collect();
    commands.sort_by(|a, b| a.name().cmp(b.name()));
    section(&mut out, "COMMANDS");
    table(
        &mut out,
        commands
            .into_iter()
            .map(|command| {
                (
                    command.names().collect::<Vec<_>>().join(", "),
                    command.description().unwrap_or_default().to_string(),
                )
            })
            .collect(),
    );

    out
}

/// Renders the usage of one command and its options.
pub fn render_command(app: &App, command: &Command) -> String {
    let mut out = String::new();

    section(&mut out, "NAME");
    let names = command.names().collect::<Vec<_>>().join(", ");
    match command.description() {
        Some(desc) => line(&mut out, &format!("{} - {}", names, desc)),
        None => line(&mut out, &names),
    }

    section(&mut out, "SYNOPSIS");
    let mut synopsis = format!("{} [global options] {}", app.program(), command.name());
    if !command.options().is_empty() {
        synopsis.push_str(" [command options]");
    }
    if let Some(arg_name) = command.arg_name() {
        synopsis.push(' ');
        synopsis.push_str(arg_name);
    }
    line(&mut out, &synopsis);

    if let Some(long) = command.long_description() {
        section(&mut out, "DESCRIPTION");
        line(&mut out, long);
    }

    if !command.options().is_empty() {
        section(&mut out, "COMMAND OPTIONS");
        table(&mut out, option_rows(command.options()));
    }

    out
}

/// The whole registry as JSON.
pub fn describe_app(app: &App) -> Value {
    json!({
        "program": app.program(),
        "description": app.description(),
        "version": app.version_text(),
        "global_options": app.global_options().iter().collect::<Vec<&Token>>(),
        "commands": app.commands().iter().map(describe_command).collect::<Vec<_>>(),
    })
}

/// One command as JSON.
pub fn describe_command(command: &Command) -> Value {
    json!({
        "name": command.name(),
        "aliases": command.aliases(),
        "description": command.description(),
        "long_description": command.long_description(),
        "arg_name": command.arg_name(),
        "skips_pre": command.skips_pre(),
        "skips_post": command.skips_post(),
        "options": command.options().iter().collect::<Vec<&Token>>(),
    })
}

fn option_rows(registry: &TokenRegistry) -> Vec<(String, String)> {
    let mut tokens: Vec<&Token> = registry.iter().collect();
    tokens.sort_by(|a, b| a.name().cmp(b.name()));
    tokens
        .into_iter()
        .map(|token| (option_usage(token), option_description(token)))
        .collect()
}

/// `-f, --file=FILE`, `-v, --verbose` or `--[no-]force`.
fn option_usage(token: &Token) -> String {
    let names: Vec<String> = token
        .names()
        .map(|name| {
            if token.is_negatable() {
                format!("--[no-]{}", name)
            } else {
                render_name(name)
            }
        })
        .collect();

    let mut usage = names.join(", ");
    if let Some(arg_name) = token.arg_name() {
        usage.push('=');
        usage.push_str(arg_name);
    }
    usage
}

fn option_description(token: &Token) -> String {
    let mut desc = token.description().unwrap_or_default().to_string();
    match token.default_value() {
        Some(OptionValue::Text(value)) => {
            let _ = write!(desc, " (default: {})", value);
        }
        Some(OptionValue::Switch(true)) if token.is_switch() => {
            desc.push_str(" (default: enabled)");
        }
        _ => {}
    }
    desc.trim_start().to_string()
}

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(title);
    out.push('\n');
}

fn line(out: &mut String, text: &str) {
    for text_line in text.lines() {
        let _ = writeln!(out, "    {}", text_line);
    }
}

fn table(out: &mut String, rows: Vec<(String, String)>) {
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    for (left, right) in rows {
        if right.is_empty() {
            let _ = writeln!(out, "    {}", left);
        } else {
            let _ = writeln!(out, "    {:<width$} - {}", left, right, width = width);
        }
    }
}
