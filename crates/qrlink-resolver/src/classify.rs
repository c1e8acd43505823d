//! Local classification of a payload: deeplink already, or something that has
//! to be resolved over the network.

use qrlink_core::Grammar;

use crate::params::{extract_params, host_of, QueryParameterMap};

/// Outcome of classifying a payload locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Parameters can be read straight from the payload.
    DirectDeeplink(QueryParameterMap),
    /// Only an outbound request can tell where this payload leads.
    OpaqueOrRedirector(String),
}

/// Classify `raw` without touching the network.
///
/// Checked in order:
/// 1. any grammar deeplink token as a substring: deeplink, whatever the rest
///    of the string looks like;
/// 2. host is an allow-listed redirector or the short-link host: must be
///    followed, even if it carries a query string;
/// 3. a query component: deeplink built from its parameters;
/// 4. anything else is opaque.
#[must_use]
pub fn classify(grammar: &Grammar, raw: &str) -> Classification {
    if grammar.is_deeplink_shaped(raw) {
        let params = extract_params(grammar, raw).unwrap_or_default();
        tracing::debug!(raw, params = params.len(), "payload is deeplink-shaped");
        return Classification::DirectDeeplink(params);
    }

    if let Some(host) = host_of(raw) {
        if grammar.is_redirector_host(&host) || grammar.is_short_link_host(&host) {
            tracing::debug!(raw, host, "payload points at a redirector host");
            return Classification::OpaqueOrRedirector(raw.to_owned());
        }
    }

    match extract_params(grammar, raw) {
        Some(params) => {
            tracing::debug!(raw, params = params.len(), "payload carries query parameters");
            Classification::DirectDeeplink(params)
        }
        None => {
            tracing::debug!(raw, "payload is opaque");
            Classification::OpaqueOrRedirector(raw.to_owned())
        }
    }
}
