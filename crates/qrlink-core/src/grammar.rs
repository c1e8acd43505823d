//! The deeplink grammar: attribute tokens, host lists and key rules that drive
//! payload classification and deeplink reconstruction.
//!
//! A [`Grammar`] is built once (defaults or YAML) and shared read-only by every
//! resolution. Token and fragment checks are substring matches; other host
//! checks are exact.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grammar {
    /// Substrings that mark a payload as an in-app deeplink.
    pub deeplink_tokens: Vec<String>,
    /// Hosts whose links must be followed over the network (e.g. Adjust).
    pub redirector_hosts: Vec<String>,
    /// Query key carrying a nested URL.
    pub nested_url_key: String,
    /// Query key read from the nested URL.
    pub nested_type_key: String,
    /// Parameter whose presence allows rebuilding a deeplink URL.
    pub build_trigger_key: String,
    /// Parameters dropped before the rebuilt URL's query is written.
    pub build_strip_keys: Vec<String>,
    /// Key under which a rebuilt deeplink URL is stored in the parameter map.
    pub deeplink_url_key: String,
    /// Response header carrying a redirect target.
    pub redirect_header: String,
    /// Host fragment of the generic landing page that wraps short-link paths.
    pub generic_host_fragment: String,
    pub short_link_host: String,
    /// Prefix prepended to a short-link path when rewriting a generic target.
    pub short_link_base: String,
    /// Query key on a generic target holding the short-link path.
    pub short_link_key: String,
    /// Address subtype that also marks a redirect target as a deeplink.
    pub pickup_subtype: String,
    pub current_country: String,
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            deeplink_tokens: strings(&["deeplink", "deep_link"]),
            redirector_hosts: strings(&["app.adjust.com", "n8du.adj.st"]),
            nested_url_key: "url".to_string(),
            nested_type_key: "type".to_string(),
            build_trigger_key: "deep_link".to_string(),
            build_strip_keys: strings(&["url", "deep_link"]),
            deeplink_url_key: "deeplinkUrl".to_string(),
            redirect_header: "Location".to_string(),
            generic_host_fragment: "mobapi.americana-food.com".to_string(),
            short_link_host: "rebrand.ly".to_string(),
            short_link_base: "https://rebrand.ly/".to_string(),
            short_link_key: "kfc".to_string(),
            pickup_subtype: "pickupHome".to_string(),
            current_country: "UAE".to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Grammar {
    /// Parse a grammar from YAML. Fields left out keep their default value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::GrammarFileParse`] on malformed YAML and
    /// [`ConfigError::Validation`] if the result breaks a grammar invariant.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let grammar: Grammar = serde_yaml::from_str(content)?;
        grammar.validate()?;
        Ok(grammar)
    }

    /// Check that every token, key and host is non-empty and that the
    /// short-link base is an absolute http(s) prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lists = [
            ("deeplink_tokens", &self.deeplink_tokens),
            ("redirector_hosts", &self.redirector_hosts),
            ("build_strip_keys", &self.build_strip_keys),
        ];
        for (field, values) in lists {
            if values.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{field} must contain at least one entry"
                )));
            }
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "{field} must not contain empty entries"
                )));
            }
        }

        let scalars = [
            ("nested_url_key", &self.nested_url_key),
            ("nested_type_key", &self.nested_type_key),
            ("build_trigger_key", &self.build_trigger_key),
            ("deeplink_url_key", &self.deeplink_url_key),
            ("redirect_header", &self.redirect_header),
            ("generic_host_fragment", &self.generic_host_fragment),
            ("short_link_host", &self.short_link_host),
            ("short_link_base", &self.short_link_base),
            ("short_link_key", &self.short_link_key),
            ("pickup_subtype", &self.pickup_subtype),
            ("current_country", &self.current_country),
        ];
        for (field, value) in scalars {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{field} must be non-empty")));
            }
        }

        let base = self.short_link_base.as_str();
        let is_http_url = Url::parse(base).is_ok_and(|url| {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        });
        if !is_http_url {
            return Err(ConfigError::Validation(format!(
                "short_link_base '{base}' must be an absolute http(s) URL"
            )));
        }

        Ok(())
    }

    /// True when any deeplink token occurs anywhere in `s`.
    #[must_use]
    pub fn is_deeplink_shaped(&self, s: &str) -> bool {
        contains_any(s, &self.deeplink_tokens)
    }

    /// Deeplink shape check used for redirect targets, which additionally
    /// accepts the pickup address subtype.
    #[must_use]
    pub fn is_redirect_deeplink_shaped(&self, s: &str) -> bool {
        self.is_deeplink_shaped(s) || s.contains(self.pickup_subtype.as_str())
    }

    /// True when `host` contains the generic landing-page fragment.
    #[must_use]
    pub fn is_generic_host(&self, host: &str) -> bool {
        host.contains(self.generic_host_fragment.as_str())
    }

    #[must_use]
    pub fn is_redirector_host(&self, host: &str) -> bool {
        self.redirector_hosts.iter().any(|h| h == host)
    }

    #[must_use]
    pub fn is_short_link_host(&self, host: &str) -> bool {
        self.short_link_host == host
    }

    #[must_use]
    pub fn is_current_country(&self, country_id: &str) -> bool {
        self.current_country == country_id
    }

    /// Compose the short-link URL for a path segment found on a generic target.
    #[must_use]
    pub fn short_link_for(&self, segment: &str) -> String {
        format!("{}{segment}", self.short_link_base)
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

/// Load and validate a grammar from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_grammar(path: &Path) -> Result<Grammar, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::GrammarFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    Grammar::from_yaml_str(&content)
}

#[cfg(test)]
#[path = "grammar_test.rs"]
mod tests;
