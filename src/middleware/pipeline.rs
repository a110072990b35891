use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ConfigurationError;
use crate::event::{Argument, ArgumentBag, Dispatcher, SharedListener, Subscriber, TypeTag};
use crate::kernel::Kernel;
use crate::middleware::{identity, Context, Controller, Decision, Middleware, Outcome};
use crate::request::Request;
use crate::route::Route;

/// A guard that has not dispatched its events yet.
///
/// The only way to a runnable [`Pipeline`] is [`activate`](Pending::activate).
pub struct Pending {
    inner: Pipeline,
}

/// An activated guard, ready to [`execute`](Pipeline::execute).
///
/// Built fresh for every evaluation and dropped afterwards.
pub struct Pipeline {
    middleware: Box<dyn Middleware>,
    trigger: TypeTag,
    request: Option<Arc<Request>>,
    kernel: Arc<Kernel>,
    controller: Arc<Controller>,
}

impl Pipeline {
    /// Assemble a guard. Nothing runs until [`Pending::activate`].
    pub fn new(
        middleware: impl Middleware,
        request: Option<Arc<Request>>,
        kernel: Arc<Kernel>,
        controller: Arc<Controller>,
    ) -> Pending {
        Self::boxed(Box::new(middleware), request, kernel, controller)
    }

    pub fn boxed(
        middleware: Box<dyn Middleware>,
        request: Option<Arc<Request>>,
        kernel: Arc<Kernel>,
        controller: Arc<Controller>,
    ) -> Pending {
        let trigger = identity(&*middleware);
        Pending { inner: Self { middleware, trigger, request, kernel, controller } }
    }

    /// Identity listeners register against to hear from this guard.
    pub fn trigger(&self) -> TypeTag { self.trigger }

    /// Run the check and turn its decision into an [`Outcome`].
    ///
    /// `Allow` builds nothing. `Override` is passed through unchanged, even
    /// on API routes. `Deny` is handed to the kernel's policy with `route`.
    pub fn execute(&self, route: &Route) -> Result<Outcome, ConfigurationError> {
        let cx = Context {
            request: self.request.as_deref(),
            controller: &self.controller,
            route,
            kernel: &self.kernel,
        };

        let decision = self.middleware.check(&cx)?;
        debug!(middleware = self.trigger.name(), route = route.path(), ?decision, "guard decided");

        Ok(match decision {
            Decision::Allow => Outcome::Allow,
            Decision::Override(res) => Outcome::Respond(res),
            Decision::Deny => {
                warn!(middleware = self.trigger.name(), route = route.path(), "access denied");
                let referer = self.request.as_deref().and_then(Request::referer);
                Outcome::Respond(self.kernel.policy().deny(route, referer))
            }
        })
    }
}

impl Pending {
    pub fn trigger(&self) -> TypeTag { self.inner.trigger }

    /// The lifecycle arguments listeners are offered, in order: the request
    /// (when there is one), the controller, then whatever the middleware adds.
    pub fn arguments(&self) -> ArgumentBag {
        let mut bag = ArgumentBag::new();
        if let Some(request) = &self.inner.request {
            bag.push(Argument::shared(Arc::clone(request)));
        }
        bag.push(Argument::shared(Arc::clone(&self.inner.controller)));
        self.inner.middleware.arguments(&mut bag);
        bag
    }

    /// Offer `args` to a single listener on behalf of this guard.
    /// See [`Dispatcher::dispatch_event`].
    pub fn dispatch_event(
        &self,
        listener: &mut dyn Subscriber,
        args: &ArgumentBag,
    ) -> Result<bool, ConfigurationError> {
        Dispatcher::new(self.inner.trigger).dispatch_event(listener, args)
    }

    /// Dispatch lifecycle events to the kernel's process-wide listeners, then
    /// hand back the runnable pipeline.
    pub fn activate(self) -> Result<Pipeline, ConfigurationError> {
        let kernel = Arc::clone(&self.inner.kernel);
        self.activate_with(kernel.listeners())
    }

    /// Like [`activate`](Pending::activate), but dispatching to `listeners`.
    /// The router passes the set it built for the current request.
    pub fn activate_with(self, listeners: &[SharedListener]) -> Result<Pipeline, ConfigurationError> {
        let args = self.arguments();
        let delivered = Dispatcher::new(self.inner.trigger).dispatch_all(listeners, &args)?;

        debug!(middleware = self.inner.trigger.name(), delivered, "guard activated");
        Ok(self.inner)
    }
}
