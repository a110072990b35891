//! Error types.
//!
//! A denied request is never an error here. Denials are ordinary
//! [`Response`](crate::Response) values produced by the
//! [`ResponsePolicy`](crate::ResponsePolicy). The types below surface
//! developer mistakes (a listener that cannot be satisfied, a check missing a
//! dependency) and infrastructure failures (binding to a port).

use thiserror::Error;

/// A misconfigured guard or listener.
///
/// These are programming errors, not user-facing conditions. They propagate
/// out of [`Pending::activate`](crate::middleware::Pending::activate) and
/// [`Pipeline::execute`](crate::middleware::Pipeline::execute) unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A listener handler declares a required parameter that no argument in
    /// the bag could satisfy.
    #[error(
        "the listener method \"{handler}\" of \"{listener}\" requires more arguments than \
         the middleware \"{middleware}\" can provide; available arguments for \"{trigger}\": {}",
        .available.join(", ")
    )]
    UnsatisfiedHandler {
        handler: &'static str,
        listener: &'static str,
        middleware: &'static str,
        trigger: &'static str,
        available: Vec<&'static str>,
    },

    /// A registry entry names a handler method the listener never declared.
    #[error("the listener \"{listener}\" has no handler method \"{handler}\"")]
    HandlerNotFound {
        handler: &'static str,
        listener: &'static str,
    },

    /// A handler asked for a parameter that was not bound, or not bound as
    /// the requested type.
    #[error("parameter \"{name}\" is not bound as {expected}")]
    UnboundParameter {
        name: &'static str,
        expected: &'static str,
    },

    /// A check could not run because something it depends on is absent.
    #[error("missing dependency: {0}")]
    MissingDependency(String),
}

/// The error type returned by warden's fallible top-level operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid value for {key}: {reason}")]
    Env { key: &'static str, reason: String },
}
