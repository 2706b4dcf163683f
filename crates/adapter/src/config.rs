//! Adapter settings, read from the environment.

#![forbid(unsafe_code)]

use adminql_core::IdentifierFormat;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const IDENTIFIER_FORMAT_ENV: &str = "ADMINQL_IDENTIFIER_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Format used when a request does not pick one.
    pub identifier_format: IdentifierFormat,
}

impl AdminConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let identifier_format = match lookup(IDENTIFIER_FORMAT_ENV) {
            None => IdentifierFormat::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(error = %e, "falling back to the default identifier format");
                IdentifierFormat::default()
            }),
        };
        Self { identifier_format }
    }

    /// The request's own format if it set one, else the configured default.
    pub fn format_for(&self, requested: Option<IdentifierFormat>) -> IdentifierFormat {
        requested.unwrap_or(self.identifier_format)
    }
}
