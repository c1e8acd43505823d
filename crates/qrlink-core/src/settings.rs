/// Hard ceiling on outbound requests per resolution.
pub const MAX_HOPS_CEILING: u32 = 2;

/// Network settings for the redirect resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    /// Outbound requests allowed per resolution, at most [`MAX_HOPS_CEILING`].
    pub max_hops: u32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: "qrlink/0.1 (deeplink-resolver)".to_string(),
            max_hops: MAX_HOPS_CEILING,
        }
    }
}
