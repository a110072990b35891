//! What a denied request gets back.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;

use crate::config::PolicyConfig;
use crate::i18n::Translator;
use crate::response::Response;
use crate::route::Route;

/// Turns a plain denial into a response.
///
/// | Route path | Response |
/// |---|---|
/// | under `api_prefix` | `403`, `{"error": translate(api_denied_key)}` |
/// | anything else | redirect to the `Referer` (or `redirect_fallback`), flashing `translate(web_denied_key)` |
#[derive(Clone)]
pub struct ResponsePolicy {
    config: PolicyConfig,
    translator: Arc<dyn Translator>,
}

impl ResponsePolicy {
    pub fn new(config: PolicyConfig, translator: Arc<dyn Translator>) -> Self {
        Self { config, translator }
    }

    pub fn config(&self) -> &PolicyConfig { &self.config }

    /// `referer` is the page to send a browser back to, when known.
    pub fn deny(&self, route: &Route, referer: Option<&str>) -> Response {
        if route.is_under(&self.config.api_prefix) {
            let message = self.translator.translate(&self.config.api_denied_key);
            return Response::structured_denial(&message, StatusCode::FORBIDDEN);
        }

        let message = self.translator.translate(&self.config.web_denied_key);
        let back = referer.unwrap_or(&self.config.redirect_fallback);
        Response::redirect_with_errors(back, vec![message])
    }
}

impl fmt::Debug for ResponsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponsePolicy").field("config", &self.config).finish_non_exhaustive()
    }
}
