//! Deeplink grammar and resolver settings shared by the qrlink crates.

pub mod config;
pub mod error;
pub mod grammar;
pub mod settings;

pub use config::{build_resolver_settings, load_resolver_settings_from_env};
pub use error::ConfigError;
pub use grammar::{load_grammar, Grammar};
pub use settings::ResolverSettings;
