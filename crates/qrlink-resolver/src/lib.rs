//! Resolution of scanned QR payloads into in-app deeplinks.
//!
//! A payload is classified locally first; only opaque or redirector links
//! cost a network round trip, and never more than two.

pub mod builder;
pub mod classify;
pub mod dispatch;
pub mod error;
pub mod params;
pub mod resolver;
pub mod transport;
pub mod validate;

pub use builder::build;
pub use classify::{classify, Classification};
pub use dispatch::{dispatch, ScanFields};
pub use error::ResolveError;
pub use params::{extract_params, QueryParameterMap};
pub use qrlink_core::{Grammar, ResolverSettings};
pub use resolver::{ResolutionResult, Resolved, Resolver};
pub use transport::{HopResponse, HttpTransport, Transport};
pub use validate::{is_short_link_url, validate_country, validate_host_allowlist};
