// src/core/paths.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failures while resolving a declared file location.
#[derive(Error, Debug)]
pub enum PathError {
    /// A home-relative path was declared but no home directory is known.
    #[error("Could not find the home directory to resolve '{0}'.")]
    HomeDirNotFound(String),
}

/// Resolves the declared location of a configuration file.
///
/// - `~` and `~/...` are expanded to the home directory.
/// - Absolute paths are returned as they are.
/// - Any other relative path is taken relative to the home directory, so
///   `.todo.toml` means `~/.todo.toml`.
pub fn resolve_config_path(declared: &str) -> Result<PathBuf, PathError> {
    let expanded = PathBuf::from(shellexpand::tilde(declared).as_ref());
    if expanded.is_absolute() {
        return Ok(expanded);
    }

    let home = dirs::home_dir().ok_or_else(|| PathError::HomeDirNotFound(declared.to_string()))?;
    Ok(home.join(expanded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("app.toml");
        let resolved = resolve_config_path(file.to_str().unwrap()).unwrap();
        assert_eq!(resolved, file);
    }

    #[test]
    fn test_relative_path_is_under_home() {
        // Skip on machines without a home directory.
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(
            resolve_config_path(".app.toml").unwrap(),
            home.join(".app.toml")
        );
        assert_eq!(
            resolve_config_path("~/conf/app.toml").unwrap(),
            home.join("conf").join("app.toml")
        );
    }
}
