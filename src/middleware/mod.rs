//! Route guards.
//!
//! A guard is a [`Middleware`]: one authorization check, run against one
//! request on its way to one controller. The check answers with a
//! [`Decision`]:
//!
//! - [`Decision::Allow`] — the controller runs
//! - [`Decision::Deny`] — the kernel's [`ResponsePolicy`](crate::ResponsePolicy)
//!   builds the denial (JSON `403` for API routes, redirect back otherwise)
//! - [`Decision::Override`] — the carried response is returned as-is, whatever
//!   the route
//!
//! Each evaluation goes through a [`Pipeline`] in two phases. `new` only
//! assembles it; [`Pending::activate`] dispatches lifecycle events to the
//! kernel's listeners and yields the runnable [`Pipeline`], whose
//! [`execute`](Pipeline::execute) runs the check. Listeners therefore always
//! observe a guard before its check does anything.
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use warden::middleware::{Context, Controller, Decision, Middleware, Outcome, Pipeline};
//! use warden::{ConfigurationError, Kernel, Request, Route};
//!
//! struct RequireToken;
//!
//! impl Middleware for RequireToken {
//!     fn check(&self, cx: &Context<'_>) -> Result<Decision, ConfigurationError> {
//!         let token = cx.request().and_then(|r| r.header("x-token"));
//!         Ok(if token == Some("letmein") { Decision::Allow } else { Decision::Deny })
//!     }
//! }
//!
//! let kernel = Kernel::new().into_shared();
//! let request = Arc::new(Request::new(Method::GET, "/api/me").with_header("x-token", "letmein"));
//! let controller = Arc::new(Controller::new("me"));
//!
//! let outcome = Pipeline::new(RequireToken, Some(request), kernel, controller)
//!     .activate()?
//!     .execute(&Route::new(Method::GET, "/api/me"))?;
//! assert!(outcome.is_allow());
//! # Ok::<(), ConfigurationError>(())
//! ```

mod pipeline;

use crate::error::ConfigurationError;
use crate::event::{ArgumentBag, AsAny, TypeTag, Typed};
use crate::kernel::Kernel;
use crate::request::Request;
use crate::response::Response;
use crate::route::Route;

pub use pipeline::{Pending, Pipeline};

/// The three ways a check can answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
    Override(Response),
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }
}

impl From<Response> for Decision {
    fn from(res: Response) -> Self {
        Self::Override(res)
    }
}

/// What the caller does next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Proceed to the controller.
    Allow,
    /// Send this instead.
    Respond(Response),
}

impl Outcome {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Allow => None,
            Self::Respond(res) => Some(res),
        }
    }
}

/// One authorization check.
///
/// Implementors are identified by their concrete type: listeners register
/// against `MyGuard`, and only `MyGuard` triggers them.
pub trait Middleware: AsAny + Send + Sync + 'static {
    /// Decide the request.
    ///
    /// Return `Err` only for programming errors, such as a dependency the
    /// check cannot run without. It propagates to the caller untouched.
    fn check(&self, cx: &Context<'_>) -> Result<Decision, ConfigurationError>;

    /// Extra lifecycle arguments for listeners, appended after the request
    /// and the controller.
    fn arguments(&self, _bag: &mut ArgumentBag) {}

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Identity of the concrete type behind a middleware trait object.
pub(crate) fn identity(middleware: &dyn Middleware) -> TypeTag {
    TypeTag::from_parts(middleware.as_any().type_id(), middleware.name())
}

/// The controller a guard stands in front of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Controller {
    name: String,
}

impl Controller {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str { &self.name }
}

impl Typed for Controller {}

/// What a check can see and touch.
pub struct Context<'a> {
    pub(crate) request: Option<&'a Request>,
    pub(crate) controller: &'a Controller,
    pub(crate) route: &'a Route,
    pub(crate) kernel: &'a Kernel,
}

impl<'a> Context<'a> {
    /// Absent when the guard runs outside an HTTP request.
    pub fn request(&self) -> Option<&'a Request> { self.request }
    pub fn controller(&self) -> &'a Controller { self.controller }
    pub fn route(&self) -> &'a Route { self.route }

    pub fn change_header_template(&self, name: &str) {
        self.kernel.set_header_template(name);
    }

    pub fn change_footer_template(&self, name: &str) {
        self.kernel.set_footer_template(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Open;
    impl Middleware for Open {
        fn check(&self, _: &Context<'_>) -> Result<Decision, ConfigurationError> {
            Ok(Decision::Allow)
        }
    }

    #[test]
    fn identity_is_the_concrete_type() {
        let boxed: Box<dyn Middleware> = Box::new(Open);
        let tag = identity(&*boxed);
        assert_eq!(tag, TypeTag::of::<Open>());
        assert!(tag.name().ends_with("Open"));
        assert_ne!(tag, TypeTag::base());
    }

    #[test]
    fn bool_and_response_convert_to_decisions() {
        assert_eq!(Decision::from(true), Decision::Allow);
        assert_eq!(Decision::from(false), Decision::Deny);
        assert_eq!(
            Decision::from(Response::redirect("/login")),
            Decision::Override(Response::redirect("/login"))
        );
    }
}
