//! CLI configuration: thin wrapper around `shelter_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--url, --api-key, --timeout).

use secrecy::SecretString;

use shelter_core::BackendConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use shelter_config::{Config, Profile, config_path, load_config_or_default, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// Build the `BackendConfig` for this invocation.
///
/// A configured profile is the base; flags override it. Without a profile,
/// `--url` and `--api-key` alone are enough.
pub fn resolve_backend(global: &GlobalOpts) -> Result<BackendConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None => {
            let url = global.url.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            Profile {
                url,
                ..Profile::default()
            }
        }
    };

    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let api_key = match global.api_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => shelter_config::resolve_api_key(&profile, &profile_name)?,
    };

    let backend =
        shelter_config::build_backend_config(&profile, &profile_name, &cfg.defaults, api_key)?;
    tracing::debug!(profile = %profile_name, url = %backend.url, "backend resolved");
    Ok(backend)
}
