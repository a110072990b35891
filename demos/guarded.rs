//! Guarded routes with an audit listener.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example guarded
//!
//! Try:
//!   curl -i http://localhost:3000/api/admin                      # 403 JSON
//!   curl -i -H 'x-role: admin' http://localhost:3000/api/admin   # 200
//!   curl -i -H 'referer: /home' http://localhost:3000/admin      # 302 back to /home
//!   curl -i http://localhost:3000/api/legacy                     # 302 to /login (override)

use std::sync::Arc;

use http::Method;
use warden::event::{EventListener, Handler, ListenerRegistry};
use warden::middleware::{Context, Controller, Decision, Middleware};
use warden::router::Guards;
use warden::{
    Catalog, ConfigurationError, Kernel, PolicyConfig, Request, Response, ResponsePolicy, Router,
    Server,
};

struct RequireAdmin;

impl Middleware for RequireAdmin {
    fn check(&self, cx: &Context<'_>) -> Result<Decision, ConfigurationError> {
        let role = cx.request().and_then(|r| r.header("x-role"));
        if role == Some("admin") {
            cx.change_header_template("AdminHeader");
        }
        Ok((role == Some("admin")).into())
    }
}

/// Sends everyone to the login page, API client or not.
struct Legacy;

impl Middleware for Legacy {
    fn check(&self, _: &Context<'_>) -> Result<Decision, ConfigurationError> {
        Ok(Decision::Override(Response::redirect("/login")))
    }
}

/// Built fresh for every request, so it logs every admin hit.
struct Audit;

#[tokio::main]
async fn main() -> Result<(), warden::Error> {
    tracing_subscriber::fmt::init();

    let audit = ListenerRegistry::new()
        .listen::<RequireAdmin>("on_admin")
        .method(
            Handler::new("on_admin", |_: &mut Audit, args| {
                let req = args.require::<Request>("request")?;
                let controller = args.require::<Controller>("controller")?;
                tracing::info!(path = req.path(), controller = controller.name(), "admin area entered");
                Ok(())
            })
            .param::<Request>("request")
            .param::<Controller>("controller"),
        )
        .into_shared();

    let catalog = Catalog::new().with("access_denied", "administrators only");
    let policy = ResponsePolicy::new(PolicyConfig::from_env()?, Arc::new(catalog));
    let kernel = Kernel::with_policy(policy)
        .per_request(move || EventListener::new(Audit, Arc::clone(&audit)))
        .into_shared();

    let admin = || Guards::new().with(|| RequireAdmin);
    let app = Router::new(kernel)
        .guarded(Method::GET, "/api/admin", admin(), admin_panel)
        .guarded(Method::GET, "/admin", admin(), admin_panel)
        .guarded(Method::GET, "/api/legacy", Guards::new().with(|| Legacy), admin_panel);

    Server::bind("0.0.0.0:3000").body_limit(64 * 1024).serve(app).await
}

async fn admin_panel(_req: Request) -> Response {
    Response::json(br#"{"panel":"admin"}"#.to_vec())
}
