//! The matched route, as guards see it.

use http::Method;

use crate::event::Typed;

/// The route a request matched: its method and its registered path pattern.
///
/// Passed explicitly to [`Pipeline::execute`](crate::middleware::Pipeline::execute);
/// there is no process-wide "current route".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    method: Method,
    path: String,
}

impl Route {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into() }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }

    /// True if the path lies under `prefix`. A plain prefix test:
    /// `/api` itself is not under `/api/`.
    pub fn is_under(&self, prefix: &str) -> bool {
        self.path.starts_with(prefix)
    }
}

impl Typed for Route {}
