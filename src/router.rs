//! Radix-tree request router with per-route guards.
//!
//! One tree per HTTP method. A route is a controller plus the guards that
//! stand in front of it. Guards are given as factories, so every request gets
//! fresh middleware instances.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::{debug, error};

use crate::error::ConfigurationError;
use crate::event::SharedListener;
use crate::kernel::Kernel;
use crate::middleware::{Controller, Middleware, Outcome, Pipeline};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::route::Route;

type GuardFactory = Arc<dyn Fn() -> Box<dyn Middleware> + Send + Sync>;

type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A controller function with its return type erased to [`Response`].
type Action = Box<dyn Fn(Request) -> BoxFuture + Send + Sync + 'static>;

/// Ordered guards for one route. Evaluated first to last; the first one that
/// does not allow decides the response.
#[derive(Clone, Default)]
pub struct Guards {
    factories: Vec<GuardFactory>,
}

impl Guards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a guard built by `factory` for every request.
    pub fn with<M, F>(mut self, factory: F) -> Self
    where
        M: Middleware,
        F: Fn() -> M + Send + Sync + 'static,
    {
        self.factories.push(Arc::new(move || Box::new(factory()) as Box<dyn Middleware>));
        self
    }

    pub fn len(&self) -> usize { self.factories.len() }
    pub fn is_empty(&self) -> bool { self.factories.is_empty() }
}

struct Endpoint {
    route: Route,
    controller: Arc<Controller>,
    guards: Guards,
    action: Action,
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
///
/// ```rust,no_run
/// # use warden::{Kernel, Request, Response, Router};
/// # use warden::middleware::{Context, Decision, Middleware};
/// # use warden::router::Guards;
/// # use http::Method;
/// # struct LoggedIn;
/// # impl Middleware for LoggedIn {
/// #     fn check(&self, _: &Context<'_>) -> Result<Decision, warden::ConfigurationError> { Ok(Decision::Allow) }
/// # }
/// # async fn home(_: Request) -> Response { Response::text("") }
/// # async fn profile(_: Request) -> Response { Response::text("") }
/// Router::new(Kernel::new().into_shared())
///     .on(Method::GET, "/", home)
///     .guarded(Method::GET, "/profile", Guards::new().with(|| LoggedIn), profile);
/// ```
pub struct Router {
    kernel: Arc<Kernel>,
    routes: HashMap<Method, MatchitRouter<Arc<Endpoint>>>,
}

impl Router {
    pub fn new(kernel: Arc<Kernel>) -> Self {
        Self { kernel, routes: HashMap::new() }
    }

    pub fn kernel(&self) -> &Arc<Kernel> { &self.kernel }

    /// Register an unguarded controller. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on<F, Fut, R>(self, method: Method, path: &str, controller: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        self.guarded(method, path, Guards::new(), controller)
    }

    /// Register a controller behind `guards`. Guards and listeners see it as
    /// a [`Controller`] named after the function's type.
    ///
    /// # Panics
    ///
    /// Same as [`on`](Router::on).
    pub fn guarded<F, Fut, R>(
        mut self,
        method: Method,
        path: &str,
        guards: Guards,
        controller: F,
    ) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        let action: Action = Box::new(move |req: Request| -> BoxFuture {
            let fut = controller(req);
            Box::pin(async move { fut.await.into_response() })
        });
        let endpoint = Endpoint {
            route: Route::new(method.clone(), path),
            controller: Arc::new(Controller::new(std::any::type_name::<F>())),
            guards,
            action,
        };
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Arc::new(endpoint))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(Arc<Endpoint>, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let endpoint = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((endpoint, params))
    }

    /// Route one request: run its guards, then its controller.
    ///
    /// Every request gets its own listener set from
    /// [`Kernel::request_listeners`], so per-request listeners hear each
    /// guard once per request. A guard that fails with a configuration error
    /// yields `500`; the error is logged, not returned.
    pub async fn handle(&self, mut req: Request) -> Response {
        let Some((endpoint, params)) = self.lookup(&req.method, &req.path) else {
            return Response::status(StatusCode::NOT_FOUND);
        };
        req.params = params;

        let req = Arc::new(req);
        match self.guard(&endpoint, &req) {
            Ok(Outcome::Allow) => {}
            Ok(Outcome::Respond(res)) => return res,
            Err(e) => {
                error!(route = endpoint.route.path(), "guard misconfigured: {e}");
                return Response::status(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }

        (endpoint.action)(Arc::unwrap_or_clone(req)).await
    }

    fn guard(
        &self,
        endpoint: &Endpoint,
        req: &Arc<Request>,
    ) -> Result<Outcome, ConfigurationError> {
        if endpoint.guards.is_empty() {
            return Ok(Outcome::Allow);
        }

        let listeners: Vec<SharedListener> = self.kernel.request_listeners();
        for factory in &endpoint.guards.factories {
            let outcome = Pipeline::boxed(
                factory(),
                Some(Arc::clone(req)),
                Arc::clone(&self.kernel),
                Arc::clone(&endpoint.controller),
            )
            .activate_with(&listeners)?
            .execute(&endpoint.route)?;

            if !outcome.is_allow() {
                return Ok(outcome);
            }
        }
        debug!(route = endpoint.route.path(), guards = endpoint.guards.len(), "all guards passed");
        Ok(Outcome::Allow)
    }
}
