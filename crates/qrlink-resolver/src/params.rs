//! Query-parameter extraction from scanned payloads.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use qrlink_core::Grammar;
use reqwest::Url;

/// Lower-cased parameter name to value.
///
/// Ordered so that rebuilt deeplinks are reproducible. Duplicate names collapse
/// to the last occurrence.
pub type QueryParameterMap = BTreeMap<String, String>;

/// One `name[=value]` pair from a query string, percent-decoded.
pub(crate) type QueryItem = (String, Option<String>);

/// Split the query component of `raw` into items.
///
/// Returns `None` when `raw` has no query component at all. A bare `?`
/// yields an empty list. Empty segments (`a=1&&b=2`) are skipped; `+` is
/// kept literally.
pub(crate) fn query_items(raw: &str) -> Option<Vec<QueryItem>> {
    let without_fragment = raw.split_once('#').map_or(raw, |(head, _)| head);
    let (_, query) = without_fragment.split_once('?')?;

    let items = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((name, value)) => (decode(name), Some(decode(value))),
            None => (decode(segment), None),
        })
        .collect();

    Some(items)
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Host of `raw` when it parses as an absolute URL.
pub(crate) fn host_of(raw: &str) -> Option<String> {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
}

/// Extract the parameter map from `raw`.
///
/// When a nested-URL item (e.g. `url=`) carries its own `type` parameter, that
/// type seeds the map. Otherwise the nested-URL key is seeded with the host of
/// `raw`. Every top-level item is then merged in under its lower-cased name,
/// missing values recorded as empty strings, so a top-level item always wins
/// over a seeded entry.
///
/// Returns `None` when `raw` has no query component.
#[must_use]
pub fn extract_params(grammar: &Grammar, raw: &str) -> Option<QueryParameterMap> {
    let items = query_items(raw)?;
    let mut params = QueryParameterMap::new();

    match nested_type(grammar, &items) {
        Some(kind) => {
            params.insert(grammar.nested_type_key.clone(), kind);
        }
        None => {
            if let Some(host) = host_of(raw) {
                params.insert(grammar.nested_url_key.clone(), host);
            }
        }
    }

    for (name, value) in items {
        params.insert(name.to_lowercase(), value.unwrap_or_default());
    }

    Some(params)
}

fn nested_type(grammar: &Grammar, items: &[QueryItem]) -> Option<String> {
    let nested = items
        .iter()
        .find(|(name, _)| *name == grammar.nested_url_key)
        .and_then(|(_, value)| value.as_deref())?;

    query_items(nested)?
        .into_iter()
        .find(|(name, _)| *name == grammar.nested_type_key)
        .map(|(_, value)| value.unwrap_or_default())
}

#[cfg(test)]
#[path = "params_test.rs"]
mod tests;
