//! Standalone checks the app runs on resolved links and fields.

use qrlink_core::Grammar;

use crate::params::host_of;

/// True when `country_id` is exactly the grammar's current country.
#[must_use]
pub fn validate_country(grammar: &Grammar, country_id: &str) -> bool {
    grammar.is_current_country(country_id)
}

/// True when the host of `url` exactly equals an allow-listed redirector host.
#[must_use]
pub fn validate_host_allowlist(grammar: &Grammar, url: &str) -> bool {
    host_of(url).is_some_and(|host| grammar.is_redirector_host(&host))
}

/// True when the host of `url` is exactly the short-link service host.
#[must_use]
pub fn is_short_link_url(grammar: &Grammar, url: &str) -> bool {
    host_of(url).is_some_and(|host| grammar.is_short_link_host(&host))
}
