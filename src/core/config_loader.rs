//! # Config Loader
//!
//! Reads and writes the persisted configuration that overlays declared
//! option defaults. The file is TOML:
//!
//! ```toml
//! file = "~/work.txt"      # global option values
//! verbose = true
//!
//! [commands.push]          # values for the options of one command
//! remote = "upstream"
//! ```
use crate::{constants::COMMANDS_CONFIG_KEY, core::errors::CliError, models::OptionValue};
use std::{collections::HashMap, fs, io::ErrorKind, path::Path};
use toml::{Table, Value};

/// Option values read from a configuration file, split into global option
/// values and per-command values keyed by command name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverlay {
    /// Values for global options, keyed by option name.
    pub globals: HashMap<String, OptionValue>,
    /// Values for command options, keyed by command name, then option name.
    pub commands: HashMap<String, HashMap<String, OptionValue>>,
}

impl ConfigOverlay {
    /// Loads the overlay stored at `path`. A missing file is an empty overlay.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No config file at '{}', using declared defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(CliError::ConfigLoad {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let overlay = Self::from_toml_str(&content).map_err(|e| CliError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        log::debug!(
            "Loaded config '{}': {} global value(s), {} command section(s)",
            path.display(),
            overlay.globals.len(),
            overlay.commands.len()
        );
        Ok(overlay)
    }

    /// Parses the TOML text of a configuration file.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let table: Table = toml::from_str(content)?;
        let mut overlay = Self::default();

        for (key, value) in table {
            if key == COMMANDS_CONFIG_KEY {
                let Value::Table(sections) = value else {
                    log::warn!("Ignoring config key '{}': expected a table", key);
                    continue;
                };
                for (command, section) in sections {
                    let Value::Table(section) = section else {
                        log::warn!("Ignoring config for command '{}': expected a table", command);
                        continue;
                    };
                    overlay.commands.insert(command, convert_table(section));
                }
                continue;
            }

            if let Some(option_value) = convert(&key, value) {
                overlay.globals.insert(key, option_value);
            }
        }

        Ok(overlay)
    }

    /// The values configured for `command`, if it has a section.
    pub fn command(&self, command: &str) -> Option<&HashMap<String, OptionValue>> {
        self.commands.get(command)
    }

    /// Renders the overlay as TOML, keys sorted.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        let mut table = Table::new();
        for (key, value) in &self.globals {
            table.insert(key.clone(), to_toml_value(value));
        }

        let mut sections = Table::new();
        for (command, values) in &self.commands {
            let section: Table = values
                .iter()
                .map(|(key, value)| (key.clone(), to_toml_value(value)))
                .collect();
            sections.insert(command.clone(), Value::Table(section));
        }
        if !sections.is_empty() {
            table.insert(COMMANDS_CONFIG_KEY.to_string(), Value::Table(sections));
        }

        toml::to_string(&table)
    }

    /// Writes the overlay to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        let write_error = |reason: String| CliError::ConfigWrite {
            path: path.to_path_buf(),
            reason,
        };

        let content = self.to_toml_string().map_err(|e| write_error(e.to_string()))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }
        fs::write(path, content).map_err(|e| write_error(e.to_string()))?;
        log::debug!("Wrote config file '{}'", path.display());
        Ok(())
    }
}

fn convert_table(table: Table) -> HashMap<String, OptionValue> {
    table
        .into_iter()
        .filter_map(|(key, value)| convert(&key, value).map(|v| (key, v)))
        .collect()
}

/// Scalars become option values; arrays and nested tables are skipped.
fn convert(key: &str, value: Value) -> Option<OptionValue> {
    match value {
        Value::String(s) => Some(OptionValue::Text(s)),
        Value::Boolean(b) => Some(OptionValue::Switch(b)),
        Value::Integer(i) => Some(OptionValue::Text(i.to_string())),
        Value::Float(f) => Some(OptionValue::Text(f.to_string())),
        Value::Datetime(d) => Some(OptionValue::Text(d.to_string())),
        Value::Array(_) | Value::Table(_) => {
            log::warn!("Ignoring config key '{}': only scalar values are supported", key);
            None
        }
    }
}

fn to_toml_value(value: &OptionValue) -> Value {
    match value {
        OptionValue::Switch(b) => Value::Boolean(*b),
        OptionValue::Text(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_globals_and_command_sections() {
        let content = r#"
            file = "b.txt"
            verbose = true
            retries = 3
            tags = ["ignored"]

            [commands.push]
            remote = "upstream"
            force = false

            [commands.status]
            short = true
        "#;

        let overlay = ConfigOverlay::from_toml_str(content).unwrap();

        assert_eq!(overlay.globals.get("file"), Some(&OptionValue::from("b.txt")));
        assert_eq!(overlay.globals.get("verbose"), Some(&OptionValue::Switch(true)));
        assert_eq!(overlay.globals.get("retries"), Some(&OptionValue::from("3")));
        assert!(!overlay.globals.contains_key("tags"));
        assert!(!overlay.globals.contains_key("commands"));

        let push = overlay.command("push").unwrap();
        assert_eq!(push.get("remote"), Some(&OptionValue::from("upstream")));
        assert_eq!(push.get("force"), Some(&OptionValue::Switch(false)));
        assert_eq!(overlay.commands.len(), 2);
    }

    #[test]
    fn test_missing_file_is_empty_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let overlay = ConfigOverlay::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(overlay, ConfigOverlay::default());
    }

    #[test]
    fn test_malformed_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "file = ").unwrap();

        let result = ConfigOverlay::load(&path);

        assert!(matches!(result, Err(CliError::ConfigLoad { .. })));
    }

    #[test]
    fn test_save_then_load_preserves_values() {
        // --- Setup ---
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.toml");
        let mut overlay = ConfigOverlay::default();
        overlay.globals.insert("file".into(), OptionValue::from("c.txt"));
        overlay.globals.insert("verbose".into(), OptionValue::Switch(false));
        overlay
            .commands
            .entry("push".into())
            .or_default()
            .insert("remote".into(), OptionValue::from("origin"));

        // --- Execute ---
        overlay.save(&path).unwrap();
        let loaded = ConfigOverlay::load(&path).unwrap();

        // --- Assert ---
        assert_eq!(loaded, overlay);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("commands.push"));
    }
}
