//! Configuration IO helpers.

use std::env;
use std::fs;
use std::fs::{create_dir_all, write};
use std::path::{Path, PathBuf};

use burwood_util::expand_tilde;
use dirs_next::config_dir;
use tracing::debug;

use crate::ProviderError;
use crate::config::ProviderConfig;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "BURWOOD_CONFIG_PATH";

/// Returns the default path for the provider configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("burwood")
        .join("portal.json")
}

/// Resolve the effective configuration.
///
/// Layers, lowest precedence first: the config file at `path` (or the
/// default path), the `PORTAL_*` environment, then `overrides`.
pub fn load_config(path: Option<&Path>, overrides: ProviderConfig) -> Result<ProviderConfig, ProviderError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let from_file = load_config_from_path(&path)?;

    Ok(from_file
        .merged_with(ProviderConfig::from_env())
        .merged_with(overrides))
}

/// Loads a configuration file. A missing file yields the defaults.
pub fn load_config_from_path(path: &Path) -> Result<ProviderConfig, ProviderError> {
    if !path.exists() {
        debug!(path = %path.display(), "no provider config file");
        return Ok(ProviderConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config: ProviderConfig = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "loaded provider config file");
    Ok(config)
}

/// Saves configuration to a specific path, creating parent directories.
pub fn save_config_to_path(config: &ProviderConfig, path: &Path) -> Result<(), ProviderError> {
    if let Some(parent_directory) = path.parent() {
        create_dir_all(parent_directory)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HOST_ENV, PASSWORD_ENV, USERNAME_ENV};

    #[test]
    fn default_path_honors_environment_override() {
        let override_path = "~/custom/burwood/portal.json";
        temp_env::with_var(CONFIG_PATH_ENV, Some(override_path), || {
            let path = default_config_path();
            assert_eq!(path, expand_tilde(override_path));
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_from_path(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("portal.json");
        let config = ProviderConfig {
            host: Some("http://localhost:5000".into()),
            username: Some("ops".into()),
            password: None,
        };

        save_config_to_path(&config, &path).expect("save");
        assert_eq!(load_config_from_path(&path).expect("load"), config);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("portal.json");
        fs::write(&path, r#"{"hostname": "typo"}"#).expect("write");
        assert!(matches!(load_config_from_path(&path), Err(ProviderError::Serialization(_))));
    }

    #[test]
    fn environment_overrides_file_and_flags_override_environment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("portal.json");
        fs::write(&path, r#"{"host": "https://file.example.com", "username": "file-user", "password": "file-pass"}"#)
            .expect("write");

        temp_env::with_vars(
            [
                (HOST_ENV, Some("https://env.example.com")),
                (USERNAME_ENV, Some("env-user")),
                (PASSWORD_ENV, None),
            ],
            || {
                let overrides = ProviderConfig {
                    username: Some("flag-user".into()),
                    ..ProviderConfig::default()
                };
                let config = load_config(Some(&path), overrides).expect("load");
                assert_eq!(config.host(), "https://env.example.com");
                assert_eq!(config.username.as_deref(), Some("flag-user"));
                assert_eq!(config.password.as_deref(), Some("file-pass"));
            },
        );
    }
}
