//! Denial policy settings.
//!
//! Defaults match what most applications want; two of them can be overridden
//! from the environment:
//!
//! - `WARDEN_API_PREFIX` — path prefix of API routes (default `/api/`)
//! - `WARDEN_REDIRECT_FALLBACK` — where a denied browser goes when the request
//!   has no `Referer` (default `/`)

use std::env;

use crate::error::Error;

const API_PREFIX_VAR: &str = "WARDEN_API_PREFIX";
const REDIRECT_FALLBACK_VAR: &str = "WARDEN_REDIRECT_FALLBACK";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Routes under this prefix get a JSON denial instead of a redirect.
    pub api_prefix: String,
    /// Translation key of the JSON denial message.
    pub api_denied_key: String,
    /// Translation key of the flashed redirect error.
    pub web_denied_key: String,
    /// Redirect target when the request carries no `Referer`.
    pub redirect_fallback: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api/".to_owned(),
            api_denied_key: "access_denied".to_owned(),
            web_denied_key: "Access Denied!".to_owned(),
            redirect_fallback: "/".to_owned(),
        }
    }
}

impl PolicyConfig {
    /// Defaults, overridden by whatever the environment sets.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(prefix) = lookup(API_PREFIX_VAR) {
            if !prefix.starts_with('/') {
                return Err(Error::Env {
                    key: API_PREFIX_VAR,
                    reason: format!("`{prefix}` must start with `/`"),
                });
            }
            config.api_prefix = prefix;
        }

        if let Some(fallback) = lookup(REDIRECT_FALLBACK_VAR) {
            if fallback.is_empty() {
                return Err(Error::Env {
                    key: REDIRECT_FALLBACK_VAR,
                    reason: "must not be empty".to_owned(),
                });
            }
            config.redirect_fallback = fallback;
        }

        Ok(config)
    }
}
