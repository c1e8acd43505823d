//! The resolution pipeline: classify, follow at most two redirects, build and
//! dispatch.
//!
//! Each call owns its redirect state in a [`Session`]; the only state shared
//! between calls on one [`Resolver`] is the read-only grammar and a
//! generation counter used to drop results of superseded scans.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use qrlink_core::settings::MAX_HOPS_CEILING;
use qrlink_core::{Grammar, ResolverSettings};
use reqwest::Url;

use crate::builder::build;
use crate::classify::{classify, Classification};
use crate::dispatch::{dispatch, ScanFields};
use crate::error::ResolveError;
use crate::params::{extract_params, host_of, QueryParameterMap};
use crate::transport::{HopResponse, HttpTransport, Transport};
use crate::validate::validate_country;

/// A successfully resolved scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub fields: ScanFields,
    /// Every extracted parameter, plus the rebuilt deeplink under the
    /// grammar's deeplink-URL key when one could be built.
    pub params: QueryParameterMap,
    pub deeplink_url: Option<String>,
}

impl Resolved {
    #[must_use]
    pub fn is_current_country(&self, grammar: &Grammar) -> bool {
        validate_country(grammar, &self.fields.country_id)
    }
}

pub type ResolutionResult = Result<Resolved, ResolveError>;

/// Per-call redirect state.
struct Session {
    token: u64,
    hops: u32,
    /// Latest redirect target; replaced on every hop.
    current: String,
}

/// What to do with a redirect target.
enum Step {
    Done(Resolved),
    Follow(String),
}

/// Resolves scanned payloads against one grammar and transport.
///
/// Cheap to share behind an `Arc`; concurrent calls only share the
/// supersession counter.
pub struct Resolver {
    grammar: Arc<Grammar>,
    transport: Arc<dyn Transport>,
    max_hops: u32,
    generation: AtomicU64,
}

impl Resolver {
    /// Creates a resolver backed by [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Transport`] if the HTTP client cannot be built.
    pub fn new(grammar: Grammar, settings: &ResolverSettings) -> Result<Self, ResolveError> {
        let transport = HttpTransport::new(settings)?;
        Ok(Self::with_transport(
            Arc::new(grammar),
            Arc::new(transport),
            settings.max_hops,
        ))
    }

    /// Creates a resolver over any transport. `max_hops` is clamped to
    /// `1..=2`.
    #[must_use]
    pub fn with_transport(
        grammar: Arc<Grammar>,
        transport: Arc<dyn Transport>,
        max_hops: u32,
    ) -> Self {
        Self {
            grammar,
            transport,
            max_hops: max_hops.clamp(1, MAX_HOPS_CEILING),
            generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Resolve a scanned payload into scan fields.
    ///
    /// Deeplink-shaped payloads resolve without any request. Everything else
    /// is fetched and its redirect target classified again. Only a generic
    /// landing page, rewritten onto the short-link host, is fetched a second
    /// time. At most `max_hops` requests are made.
    ///
    /// Starting a new resolution on the same resolver supersedes this one: if
    /// it is still waiting on the network, it returns
    /// [`ResolveError::Superseded`] instead of a result.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::MalformedUrl`] if a URL to fetch does not parse.
    /// - [`ResolveError::NoRedirectFound`] if a fetch returns no redirect.
    /// - [`ResolveError::UnclassifiableRedirectTarget`] if a redirect target
    ///   cannot be decoded or yields no deeplink.
    /// - [`ResolveError::Transport`] on network failure.
    /// - [`ResolveError::HopLimitExceeded`] if the chain needs a third request.
    /// - [`ResolveError::Superseded`] if a newer call started meanwhile.
    pub async fn resolve(&self, raw: &str) -> ResolutionResult {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = match classify(&self.grammar, raw) {
            Classification::DirectDeeplink(params) => Ok(self.finish(params)),
            Classification::OpaqueOrRedirector(url) => {
                let mut session = Session {
                    token,
                    hops: 0,
                    current: url,
                };
                self.follow(&mut session).await
            }
        };

        match &result {
            Ok(resolved) => tracing::info!(
                store_id = %resolved.fields.store_id,
                country_id = %resolved.fields.country_id,
                kind = %resolved.fields.kind,
                "scan resolved"
            ),
            Err(err) => tracing::warn!(raw, error = %err, "scan could not be resolved"),
        }
        result
    }

    /// Resolve `raw` and hand the outcome to `on_complete`, exactly once.
    pub async fn resolve_with<F>(&self, raw: &str, on_complete: F)
    where
        F: FnOnce(ResolutionResult) + Send,
    {
        on_complete(self.resolve(raw).await);
    }

    async fn follow(&self, session: &mut Session) -> ResolutionResult {
        loop {
            if session.hops >= self.max_hops {
                return Err(ResolveError::HopLimitExceeded {
                    max_hops: self.max_hops,
                });
            }

            let url = Url::parse(&session.current).map_err(|_| ResolveError::MalformedUrl {
                url: session.current.clone(),
            })?;

            session.hops += 1;
            tracing::info!(hop = session.hops, url = %url, "fetching redirect");
            let response = self.transport.get(&url).await;
            self.ensure_current(session.token)?;
            let response = response?;

            let target = self.redirect_target(&url, &response)?;
            match self.settle(&target)? {
                Step::Done(resolved) => return Ok(resolved),
                Step::Follow(next) => session.current = next,
            }
        }
    }

    /// Read, absolutize and percent-decode the redirect header of `response`.
    fn redirect_target(&self, url: &Url, response: &HopResponse) -> Result<String, ResolveError> {
        let header = if response.is_redirect() {
            response.header(&self.grammar.redirect_header)
        } else {
            None
        };
        let location = header.ok_or_else(|| ResolveError::NoRedirectFound {
            url: url.to_string(),
            status: response.status.as_u16(),
        })?;

        let absolute = if Url::parse(location).is_ok() {
            location.to_owned()
        } else {
            url.join(location)
                .map_err(|_| ResolveError::UnclassifiableRedirectTarget {
                    target: location.to_owned(),
                })?
                .to_string()
        };

        let decoded = percent_decode_str(&absolute)
            .decode_utf8()
            .map(Cow::into_owned);
        decoded.map_err(|_| {
            tracing::warn!(location, "redirect target is not valid UTF-8 once decoded");
            ResolveError::UnclassifiableRedirectTarget { target: absolute }
        })
    }

    /// Decide what a redirect target leads to. Emits at most one result.
    ///
    /// Only a generic landing page leads to another request; any other target
    /// must carry its parameters itself.
    fn settle(&self, target: &str) -> Result<Step, ResolveError> {
        let grammar = &*self.grammar;

        if host_of(target).is_some_and(|host| grammar.is_generic_host(&host)) {
            let key = grammar.short_link_key.to_lowercase();
            let segment = extract_params(grammar, target)
                .and_then(|mut params| params.remove(&key))
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| ResolveError::UnclassifiableRedirectTarget {
                    target: target.to_owned(),
                })?;
            let rewritten = grammar.short_link_for(&segment);
            tracing::debug!(
                redirect = target,
                rewritten,
                "rewrote generic target onto short-link host"
            );
            return Ok(Step::Follow(rewritten));
        }

        if grammar.is_redirect_deeplink_shaped(target) {
            let params = extract_params(grammar, target).unwrap_or_default();
            return Ok(Step::Done(self.finish(params)));
        }

        match classify(grammar, target) {
            Classification::DirectDeeplink(params) => Ok(Step::Done(self.finish(params))),
            Classification::OpaqueOrRedirector(_) => {
                tracing::warn!(redirect = target, "redirect target carries no deeplink");
                Err(ResolveError::UnclassifiableRedirectTarget {
                    target: target.to_owned(),
                })
            }
        }
    }

    fn finish(&self, mut params: QueryParameterMap) -> Resolved {
        let deeplink_url = build(&self.grammar, &params);
        if let Some(url) = &deeplink_url {
            params.insert(self.grammar.deeplink_url_key.clone(), url.clone());
        }
        Resolved {
            fields: dispatch(&params),
            params,
            deeplink_url,
        }
    }

    fn ensure_current(&self, token: u64) -> Result<(), ResolveError> {
        if self.generation.load(Ordering::SeqCst) == token {
            Ok(())
        } else {
            tracing::warn!(token, "dropping response of superseded scan");
            Err(ResolveError::Superseded)
        }
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
