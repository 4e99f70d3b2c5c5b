use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::{GeocodeError, Result};

/// Environment variable holding the Geoapify API key.
pub const API_KEY_ENV: &str = "GEOAPIFY_KEY";

/// Geoapify API key. Opaque, never empty, and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(GeocodeError::config(
                "API key is empty.\n\
                 Hint: set GEOAPIFY_KEY or run `geocode configure`.",
            ));
        }
        Ok(Self(key))
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(********)")
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// base_url = "https://api.geoapify.com"
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,

    /// Overrides the Geoapify endpoint host, e.g. for a proxy.
    pub base_url: Option<String>,

    /// Request timeout; absent means no timeout.
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`; a missing file is an empty config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            GeocodeError::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        toml::from_str(&contents).map_err(|e| {
            GeocodeError::config(format!("Failed to parse config file {}: {e}", path.display()))
        })
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(&path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "geocode", "geocode-cli").ok_or_else(|| {
            GeocodeError::config("Could not determine platform config directory")
        })?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| GeocodeError::config(format!("Invalid config TOML: {e}")))
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Pick the credential: the environment value wins over the file's `api_key`.
    /// Empty values count as absent.
    pub fn resolve_credential(&self, env_key: Option<String>) -> Result<Credential> {
        let from_env = env_key.filter(|k| !k.trim().is_empty());
        if from_env.is_some() {
            tracing::debug!("using API key from {API_KEY_ENV}");
        }

        let key = from_env
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                GeocodeError::config(format!(
                    "No Geoapify API key configured.\n\
                     Hint: export {API_KEY_ENV}=<your key> or run `geocode configure`."
                ))
            })?;

        Credential::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn credential_rejects_empty_key() {
        assert!(matches!(Credential::new(""), Err(GeocodeError::Config(_))));
        assert!(matches!(Credential::new("   "), Err(GeocodeError::Config(_))));
    }

    #[test]
    fn credential_debug_is_redacted() {
        let cred = Credential::new("SECRET_KEY").unwrap();
        let out = format!("{cred:?}");
        assert!(!out.contains("SECRET_KEY"));
    }

    #[test]
    fn resolve_errors_when_nothing_configured() {
        let cfg = Config::default();
        let err = cfg.resolve_credential(None).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No Geoapify API key configured"));
        assert!(msg.contains("geocode configure"));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let cred = cfg.resolve_credential(Some("ENV_KEY".into())).unwrap();
        assert_eq!(cred.expose(), "ENV_KEY");

        let cred = cfg.resolve_credential(None).unwrap();
        assert_eq!(cred.expose(), "FILE_KEY");
    }

    #[test]
    fn empty_env_key_falls_back_to_file() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let cred = cfg.resolve_credential(Some(String::new())).unwrap();
        assert_eq!(cred.expose(), "FILE_KEY");

        cfg.set_api_key(String::new());
        assert!(cfg.resolve_credential(Some(" ".into())).is_err());
    }

    #[test]
    fn toml_roundtrip_keeps_all_fields() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            base_url: Some("http://localhost:8080".into()),
            timeout_secs: Some(5),
        };

        let text = cfg.to_toml().unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn empty_toml_is_default_config() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.timeout(), None);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = Config::from_toml("timeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, GeocodeError::Config(_)));
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn load_from_reads_saved_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"KEY\"\ntimeout_secs = 3\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn load_from_corrupt_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [unterminated").unwrap();

        let err = Config::load_from(&path).unwrap_err();

        assert!(matches!(err, GeocodeError::Config(_)));
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
