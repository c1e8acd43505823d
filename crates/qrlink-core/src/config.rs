use crate::settings::{ResolverSettings, MAX_HOPS_CEILING};
use crate::ConfigError;

/// Load resolver settings from variables already in the process environment.
///
/// Resolution never calls this on its own; embedding applications opt in.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but invalid.
pub fn load_resolver_settings_from_env() -> Result<ResolverSettings, ConfigError> {
    build_resolver_settings(|key| std::env::var(key))
}

/// Build resolver settings using the provided env-var lookup function.
///
/// Every key is optional; absent keys take the [`ResolverSettings::default`]
/// value.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for non-numeric values or a hop cap
/// outside `1..=2`.
pub fn build_resolver_settings<F>(lookup: F) -> Result<ResolverSettings, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = ResolverSettings::default();

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let request_timeout_secs =
        parse_u64("QRLINK_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?;
    let connect_timeout_secs =
        parse_u64("QRLINK_CONNECT_TIMEOUT_SECS", defaults.connect_timeout_secs)?;
    let user_agent = lookup("QRLINK_USER_AGENT").unwrap_or(defaults.user_agent);

    let max_hops = parse_u64("QRLINK_MAX_HOPS", u64::from(defaults.max_hops))?;
    let max_hops = u32::try_from(max_hops)
        .ok()
        .filter(|hops| (1..=MAX_HOPS_CEILING).contains(hops))
        .ok_or_else(|| ConfigError::InvalidEnvVar {
            var: "QRLINK_MAX_HOPS".to_string(),
            reason: format!("must be between 1 and {MAX_HOPS_CEILING}, got {max_hops}"),
        })?;

    Ok(ResolverSettings {
        request_timeout_secs,
        connect_timeout_secs,
        user_agent,
        max_hops,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
