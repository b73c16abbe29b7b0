//! Shared configuration for the shelter tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `shelter_core::BackendConfig`. The CLI layers its
//! flag overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use shelter_core::{BackendConfig, RetryPolicy, TlsVerification};

const KEYRING_SERVICE: &str = "shelter";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use, preferring an explicit choice.
    pub fn profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-request deadline in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_realtime")]
    pub realtime: bool,

    /// Change-feed coalescing window in milliseconds.
    #[serde(default = "default_coalesce_ms")]
    pub coalesce_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            realtime: default_realtime(),
            coalesce_ms: default_coalesce_ms(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    15
}
fn default_realtime() -> bool {
    true
}
fn default_coalesce_ms() -> u64 {
    200
}

/// A named backend profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend project URL (e.g., "https://abcd.supabase.co").
    pub url: String,

    /// API key (plaintext, prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Environment variable name containing a signed-in admin's access token.
    pub access_token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification (local development stacks only).
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override the realtime change feed.
    pub realtime: Option<bool>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "pawhaven", "shelter").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("shelter");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` layered over defaults, then `SHELTER_` env vars
/// (`SHELTER_DEFAULTS__TIMEOUT=30`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SHELTER_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str, what: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{what}"))
}

/// Resolve an API key: profile env var, then keyring, then plaintext.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(val) = profile
        .api_key_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
    {
        return Ok(SecretString::from(val));
    }

    if let Ok(secret) = keyring_entry(profile_name, "api-key").and_then(|e| e.get_password()) {
        return Ok(SecretString::from(secret));
    }

    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Optional admin access token: profile env var, then keyring.
pub fn resolve_access_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    profile
        .access_token_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
        .or_else(|| {
            keyring_entry(profile_name, "access-token")
                .and_then(|e| e.get_password())
                .ok()
        })
        .map(SecretString::from)
}

/// Store an API key in the system keyring for `profile_name`.
pub fn store_api_key(profile_name: &str, key: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "api-key")?.set_password(key.expose_secret())?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `BackendConfig` from a profile with no CLI flag overrides.
pub fn profile_to_backend_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<BackendConfig, ConfigError> {
    let api_key = resolve_api_key(profile, profile_name)?;
    build_backend_config(profile, profile_name, defaults, api_key)
}

/// As [`profile_to_backend_config`], with an already-resolved key.
pub fn build_backend_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    api_key: SecretString,
) -> Result<BackendConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = BackendConfig::new(url, api_key);
    config.access_token = resolve_access_token(profile, profile_name);
    config.tls = tls;
    config.retry = RetryPolicy {
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        ..RetryPolicy::default()
    };
    config.realtime_enabled = profile.realtime.unwrap_or(defaults.realtime);
    config.coalesce_window = Duration::from_millis(defaults.coalesce_ms);
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile(url: &str) -> Profile {
        Profile {
            url: url.into(),
            api_key: Some("anon-key".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 15);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.default_profile = Some("staging".into());
        cfg.profiles.insert("staging".into(), profile("https://staging.example.org"));
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profile_name(None), "staging");
        assert_eq!(loaded.profile_name(Some("prod")), "prod");
        assert_eq!(
            loaded.profile("staging").unwrap().url,
            "https://staging.example.org"
        );
        assert!(matches!(
            loaded.profile("prod"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[defaults]\ntimeout = 40\n\n[profiles.default]\nurl = \"https://x.example.org\"\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.timeout, 40);
        assert_eq!(cfg.defaults.coalesce_ms, 200);
        assert_eq!(cfg.profiles["default"].api_key, None);
    }

    #[test]
    fn translation_applies_profile_overrides() {
        let mut p = profile("https://x.example.org");
        p.timeout = Some(5);
        p.realtime = Some(false);

        let cfg = build_backend_config(&p, "test", &Defaults::default(), SecretString::from("k"))
            .unwrap();
        assert_eq!(cfg.retry.timeout, Duration::from_secs(5));
        assert!(!cfg.realtime_enabled);
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
        assert_eq!(cfg.coalesce_window, Duration::from_millis(200));
    }

    #[test]
    fn insecure_wins_over_custom_ca() {
        let mut p = profile("http://localhost:54321");
        p.ca_cert = Some("/etc/ssl/dev.pem".into());
        p.insecure = Some(true);

        let cfg = build_backend_config(&p, "local", &Defaults::default(), SecretString::from("k"))
            .unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = build_backend_config(
            &profile("not a url"),
            "bad",
            &Defaults::default(),
            SecretString::from("k"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "url"));

        let err = build_backend_config(
            &profile("ftp://files.example.org"),
            "bad",
            &Defaults::default(),
            SecretString::from("k"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn plaintext_key_is_last_resort() {
        let mut p = profile("https://x.example.org");
        p.api_key_env = Some("SHELTER_TEST_KEY_THAT_IS_NEVER_SET".into());
        let key = resolve_api_key(&p, "shelter-config-test-profile").unwrap();
        assert_eq!(key.expose_secret(), "anon-key");

        p.api_key = None;
        assert!(matches!(
            resolve_api_key(&p, "shelter-config-test-profile"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }
}
