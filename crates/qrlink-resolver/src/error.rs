use thiserror::Error;

/// Why a scanned payload could not be resolved.
///
/// Callers see every variant as the same "could not read QR" outcome; the
/// variants exist for logging and for choosing between "scan again" and
/// "check your connection".
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The payload had to be fetched but is not a well-formed URL.
    #[error("malformed URL: {url}")]
    MalformedUrl { url: String },

    /// The outbound request finished without an HTTP redirect.
    #[error("no redirect from {url} (HTTP {status})")]
    NoRedirectFound { url: String, status: u16 },

    /// A redirect target is neither deeplink-shaped nor rewritable.
    #[error("unclassifiable redirect target: {target}")]
    UnclassifiableRedirectTarget { target: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Another request was needed after the hop cap was reached.
    #[error("redirect chain exceeded {max_hops} outbound requests")]
    HopLimitExceeded { max_hops: u32 },

    /// A newer resolution started on the same resolver while this one waited.
    #[error("resolution superseded by a newer scan")]
    Superseded,
}

impl ResolveError {
    /// True when the payload itself is at fault, as opposed to the network or
    /// a newer scan.
    #[must_use]
    pub fn is_terminal_classification(&self) -> bool {
        match self {
            ResolveError::MalformedUrl { .. }
            | ResolveError::NoRedirectFound { .. }
            | ResolveError::UnclassifiableRedirectTarget { .. }
            | ResolveError::HopLimitExceeded { .. } => true,
            ResolveError::Transport(_) | ResolveError::Superseded => false,
        }
    }
}
