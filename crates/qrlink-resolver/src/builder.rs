//! Reconstruction of a canonical deeplink URL from extracted parameters.

use qrlink_core::Grammar;

use crate::params::QueryParameterMap;

/// Rebuild a deeplink as `<trigger>?k=v&k=v` from `params`.
///
/// `<trigger>` is the value of the grammar's build-trigger key; when that key
/// is absent nothing is built and `None` is returned. Keys in the grammar's
/// strip list are left out. Entries follow the map's key order, so the same
/// input always yields the same string. Values are written as-is.
#[must_use]
pub fn build(grammar: &Grammar, params: &QueryParameterMap) -> Option<String> {
    let trigger = params.get(&grammar.build_trigger_key)?;

    let query = params
        .iter()
        .filter(|(name, _)| !grammar.build_strip_keys.contains(*name))
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let url = format!("{trigger}?{query}");
    tracing::debug!(url, "rebuilt deeplink");
    Some(url)
}
