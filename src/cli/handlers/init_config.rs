// src/cli/handlers/init_config.rs

use crate::{
    cli::App,
    constants::{HELP_COMMAND, INIT_CONFIG_COMMAND, VERSION_SWITCH},
    core::{config_loader::ConfigOverlay, errors::CliError, options::Options},
    models::Outcome,
};
use anyhow::anyhow;

/// Body of the built-in `initconfig` command: writes the current global
/// option values and command defaults to the declared config file.
pub(crate) fn handle(app: &App, global: &Options, options: &Options) -> Result<Outcome, CliError> {
    let path = app
        .config_path()?
        .ok_or_else(|| anyhow!("No configuration file was declared for '{}'", app.program()))?;

    if path.exists() && !options.is_on("force") {
        return Err(CliError::ConfigExists(path));
    }

    snapshot(app, global).save(&path)?;
    println!("Configuration file '{}' written.", path.display());
    Ok(Outcome::Success)
}

/// Builds the overlay `initconfig` writes.
///
/// Global values come from the resolved options (explicit or defaulted),
/// stored under canonical names only. Command values are the effective
/// defaults of each command's options; built-in commands are left out.
pub(crate) fn snapshot(app: &App, global: &Options) -> ConfigOverlay {
    let mut overlay = ConfigOverlay::default();

    for token in app.global_options() {
        if app.version_text().is_some() && token.name() == VERSION_SWITCH {
            continue;
        }
        if let Some(value) = global.get(token.name()) {
            overlay.globals.insert(token.name().to_string(), value.clone());
        }
    }

    for command in app.commands().iter() {
        if command.name() == HELP_COMMAND || command.name() == INIT_CONFIG_COMMAND {
            continue;
        }
        let values: std::collections::HashMap<_, _> = command
            .options()
            .iter()
            .filter_map(|token| {
                token
                    .default_value()
                    .map(|value| (token.name().to_string(), value.clone()))
            })
            .collect();
        if !values.is_empty() {
            overlay.commands.insert(command.name().to_string(), values);
        }
    }

    overlay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionValue;
    use std::fs;

    fn app_with_config(path: &std::path::Path) -> App {
        let mut app = App::new("prog");
        app.config_file(path.to_str().unwrap());
        app.version("1.0").unwrap();
        app.flag(["f", "file"]).unwrap().default_value("a.txt");
        app.switch(["v", "verbose"]).unwrap();
        let mut push = app.command(["push"]).unwrap();
        push.flag(["remote"]).unwrap().default_value("origin");
        push.switch(["force"]).unwrap();
        push.action(|_, _, _| Ok(Outcome::Success));
        app
    }

    #[test]
    fn test_initconfig_writes_globals_and_command_defaults() {
        // --- Setup ---
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.toml");
        let mut app = app_with_config(&path);

        // --- Execute ---
        let code = app.run(["-v", "--file", "b.txt", "initconfig"]).unwrap();

        // --- Assert ---
        assert_eq!(code, 0);
        let written = ConfigOverlay::load(&path).unwrap();
        assert_eq!(written.globals.get("f"), Some(&OptionValue::from("b.txt")));
        assert_eq!(written.globals.get("v"), Some(&OptionValue::Switch(true)));
        assert!(!written.globals.contains_key("file"));
        assert!(!written.globals.contains_key(VERSION_SWITCH));
        assert_eq!(
            written.command("push").unwrap().get("remote"),
            Some(&OptionValue::from("origin"))
        );
        assert!(written.command(HELP_COMMAND).is_none());
    }

    #[test]
    fn test_initconfig_refuses_to_overwrite_without_force() {
        // --- Setup ---
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.toml");
        fs::write(&path, "f = \"keep.txt\"\n").unwrap();
        let mut app = app_with_config(&path);
        app.error_output(std::io::sink());

        // --- Execute & Assert ---
        let code = app.run(["initconfig"]).unwrap();
        assert_eq!(code, crate::constants::GENERIC_EXIT_CODE);
        assert_eq!(fs::read_to_string(&path).unwrap(), "f = \"keep.txt\"\n");

        // The existing file was loaded as the overlay, so its value is what
        // gets written back alongside the other defaults.
        let code = app.run(["initconfig", "--force"]).unwrap();
        assert_eq!(code, 0);
        let written = ConfigOverlay::load(&path).unwrap();
        assert_eq!(written.globals.get("f"), Some(&OptionValue::from("keep.txt")));
    }
}
