//! # warden
//!
//! Route guards with typed lifecycle events, for services built on hyper.
//!
//! ## The contract
//!
//! Every guarded route runs its guards before its controller. A guard is one
//! authorization check, and it answers one of three ways:
//!
//! - **Allow** — on to the next guard, then the controller
//! - **Deny** — warden answers for you: `403 {"error": …}` on API routes
//!   (under `/api/` by default), a redirect back with a flashed
//!   `Access Denied!` everywhere else
//! - **Override** — your own response, returned verbatim whatever the route
//!
//! Before a guard's check runs, the guard raises a lifecycle event. Listeners
//! registered on the [`Kernel`] subscribe per concrete guard type, declare
//! typed handler parameters, and receive the request, the controller, and
//! whatever the guard adds, matched by type rather than position. Each
//! listener instance handles an event at most once.
//!
//! What warden leaves to the application:
//!
//! - **Sessions** — flashed errors ride in the response extensions as
//!   [`Flash`]; persisting them is the session layer's job
//! - **Templates** — guards can name a header or footer template on the
//!   kernel; rendering them is the view layer's job
//! - **Listener lifetime** — warden never resets the once-only flag. Register
//!   a factory with [`Kernel::per_request`] for a listener that hears every
//!   request, or a single instance with [`Kernel::listener`] for one that
//!   hears only the first
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::Method;
//! use warden::middleware::{Context, Decision, Middleware};
//! use warden::router::Guards;
//! use warden::{ConfigurationError, Kernel, Request, Response, Router, Server};
//!
//! struct LoggedIn;
//!
//! impl Middleware for LoggedIn {
//!     fn check(&self, cx: &Context<'_>) -> Result<Decision, ConfigurationError> {
//!         let session = cx.request().and_then(|r| r.header("cookie"));
//!         Ok(session.is_some().into())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new(Kernel::new().into_shared())
//!         .guarded(Method::GET, "/api/me", Guards::new().with(|| LoggedIn), me);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn me(_req: Request) -> Response {
//!     Response::json(br#"{"name":"ana"}"#.to_vec())
//! }
//! ```

mod config;
mod error;
mod i18n;
mod kernel;
mod policy;
mod request;
mod response;
mod route;
mod server;

pub mod event;
pub mod middleware;
pub mod router;

pub use config::PolicyConfig;
pub use error::{ConfigurationError, Error};
pub use i18n::{Catalog, Translator};
pub use kernel::Kernel;
pub use policy::ResponsePolicy;
pub use request::Request;
pub use response::{ContentType, Flash, IntoResponse, Response, ResponseBuilder};
pub use route::Route;
pub use router::Router;
pub use server::{DEFAULT_BODY_LIMIT, Server};
