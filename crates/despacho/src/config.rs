//! CLI configuration: thin wrapper around `despacho_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --timeout, --insecure, --no-persist).

use std::sync::Arc;

use despacho_core::{ApiConfig, MemoryTokenStore, TokenStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use despacho_config::{
    Config, DEFAULT_PROFILE, Profile, config_path, data_dir, load_config_or_default, save_config,
};

/// Everything needed to open a console for one invocation.
pub struct Resolved {
    pub profile_name: String,
    pub api: ApiConfig,
    pub tokens: Arc<dyn TokenStore>,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// Error for a profile name missing from `config`, listing what exists.
pub fn profile_not_found(config: &Config, name: &str) -> CliError {
    let mut available: Vec<_> = config.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name: name.into(),
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Pick the profile and apply flag overrides on top of it.
///
/// Without a stored profile, `--api-url` alone is enough.
pub fn effective_profile(
    global: &GlobalOpts,
    config: &Config,
    profile_name: &str,
) -> Result<Profile, CliError> {
    let mut profile = match (config.profiles.get(profile_name), global.api_url.as_deref()) {
        (Some(stored), _) => stored.clone(),
        (None, Some(url)) => Profile::new(url),
        (None, None) if global.profile.is_some() => {
            return Err(profile_not_found(config, profile_name));
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    Ok(profile)
}

/// Build the API config and token store for this invocation.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);
    let profile = effective_profile(global, &cfg, &profile_name)?;

    let api = despacho_config::profile_to_api_config(&profile, &cfg.defaults)?;
    let tokens: Arc<dyn TokenStore> = if global.no_persist {
        Arc::new(MemoryTokenStore::new())
    } else {
        despacho_config::token_store(&data_dir(), &profile_name, &profile)?
    };

    tracing::debug!(profile = %profile_name, url = %api.url, "resolved profile");
    Ok(Resolved {
        profile_name,
        api,
        tokens,
    })
}
