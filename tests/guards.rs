use std::any::Any;
use std::sync::Arc;

use http::{Method, StatusCode};
use parking_lot::Mutex;
use warden::event::{
    self, ArgumentBag, Dispatcher, EventListener, Handler, ListenerRegistry, Subscriber, TypeTag,
    Typed,
};
use warden::middleware::{Context, Controller, Decision, Middleware, Outcome, Pipeline};
use warden::router::Guards;
use warden::{Catalog, ConfigurationError, Kernel, Request, Response, Route, Router};

// ── fixtures ─────────────────────────────────────────────────────────────────

struct Fixed(Decision);

impl Middleware for Fixed {
    fn check(&self, _: &Context<'_>) -> Result<Decision, ConfigurationError> {
        Ok(self.0.clone())
    }
}

struct User {
    name: &'static str,
}
impl Typed for User {}

struct Admin {
    user: User,
}
impl Typed for Admin {
    fn ancestor(&self) -> Option<&dyn Any> {
        Some(&self.user)
    }
}

/// Lets the admin through and offers the admin to listeners.
struct RequireAdmin;

impl Middleware for RequireAdmin {
    fn check(&self, _: &Context<'_>) -> Result<Decision, ConfigurationError> {
        Ok(Decision::Allow)
    }

    fn arguments(&self, bag: &mut ArgumentBag) {
        bag.push(event::Argument::new(Admin { user: User { name: "root" } }));
    }
}

struct RequireLogin;

impl Middleware for RequireLogin {
    fn check(&self, cx: &Context<'_>) -> Result<Decision, ConfigurationError> {
        Ok(cx.request().and_then(|r| r.header("cookie")).is_some().into())
    }
}

#[derive(Default)]
struct Audit {
    seen: Vec<String>,
}

fn kernel() -> Kernel {
    let catalog = Catalog::new()
        .with("access_denied", "Zugriff verweigert")
        .with("Access Denied!", "Kein Zutritt!");
    Kernel::with_translator(Arc::new(catalog))
}

async fn secret(_req: Request) -> Response {
    Response::text("secret")
}

fn router(kernel: Kernel, decision: Decision) -> Router {
    let guards = || Guards::new().with({
        let decision = decision.clone();
        move || Fixed(decision.clone())
    });
    Router::new(kernel.into_shared())
        .guarded(Method::GET, "/api/secret", guards(), secret)
        .guarded(Method::GET, "/secret", guards(), secret)
}

// ── decisions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn allow_reaches_the_controller() {
    let app = router(kernel(), Decision::Allow);

    let res = app.handle(Request::new(Method::GET, "/api/secret")).await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), b"secret");
}

#[tokio::test]
async fn deny_on_api_route_is_translated_403() {
    let app = router(kernel(), Decision::Deny);

    let res = app.handle(Request::new(Method::GET, "/api/secret")).await;

    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Zugriff verweigert" }));
}

#[tokio::test]
async fn deny_on_web_route_redirects_back_with_one_error() {
    let app = router(kernel(), Decision::Deny);

    let req = Request::new(Method::GET, "/secret").with_header("referer", "/dashboard");
    let res = app.handle(req).await;

    assert_eq!(res.status_code(), StatusCode::FOUND);
    assert_eq!(res.location(), Some("/dashboard"));
    assert_eq!(res.errors(), ["Kein Zutritt!"]);
}

#[tokio::test]
async fn override_is_returned_verbatim_on_api_route() {
    let login = Response::redirect("/login");
    let app = router(kernel(), Decision::Override(login.clone()));

    let res = app.handle(Request::new(Method::GET, "/api/secret")).await;

    assert_eq!(res, login);
}

#[tokio::test]
async fn first_non_allowing_guard_decides() {
    let guards = Guards::new()
        .with(|| Fixed(Decision::Allow))
        .with(|| RequireLogin)
        .with(|| Fixed(Decision::Override(Response::redirect("/never"))));
    let app = Router::new(kernel().into_shared()).guarded(Method::GET, "/api/me", guards, secret);

    let res = app.handle(Request::new(Method::GET, "/api/me")).await;

    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn misconfigured_guard_is_a_500() {
    struct NeedsStore;
    impl Middleware for NeedsStore {
        fn check(&self, _: &Context<'_>) -> Result<Decision, ConfigurationError> {
            Err(ConfigurationError::MissingDependency("store".to_owned()))
        }
    }

    let app = Router::new(kernel().into_shared())
        .guarded(Method::GET, "/x", Guards::new().with(|| NeedsStore), secret);

    let res = app.handle(Request::new(Method::GET, "/x")).await;

    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = router(kernel(), Decision::Allow);
    let res = app.handle(Request::new(Method::GET, "/nope")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

// ── events ───────────────────────────────────────────────────────────────────

fn audit_registry() -> Arc<ListenerRegistry<Audit>> {
    ListenerRegistry::new()
        .listen::<RequireAdmin>("on_admin")
        .method(
            Handler::new("on_admin", |audit: &mut Audit, args| {
                let user = args.require::<User>("user")?;
                let controller = args.require::<Controller>("controller")?;
                audit.seen.push(format!("{} -> {}", user.name, controller.name()));
                Ok(())
            })
            .param::<User>("user")
            .param::<Controller>("controller"),
        )
        .into_shared()
}

#[tokio::test]
async fn per_request_listener_hears_guard_on_every_request() {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let log = Arc::clone(&seen);
    let kernel = kernel().per_request(move || {
        let log = Arc::clone(&log);
        let registry = ListenerRegistry::new()
            .listen::<RequireAdmin>("on_admin")
            .method(
                Handler::new("on_admin", move |_: &mut (), args| {
                    let user = args.require::<User>("user")?;
                    log.lock().push(user.name.to_owned());
                    Ok(())
                })
                .param::<User>("user"),
            )
            .into_shared();
        EventListener::new((), registry)
    });
    let app = Router::new(kernel.into_shared())
        .guarded(Method::GET, "/admin", Guards::new().with(|| RequireAdmin), secret);

    for _ in 0..3 {
        let res = app.handle(Request::new(Method::GET, "/admin")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
    }

    assert_eq!(*seen.lock(), ["root", "root", "root"]);
}

#[tokio::test]
async fn process_wide_listener_hears_guard_only_once() {
    let audit = Arc::new(Mutex::new(EventListener::new(Audit::default(), audit_registry())));
    let kernel = kernel().listener(audit.clone());
    let app = Router::new(kernel.into_shared())
        .guarded(Method::GET, "/admin", Guards::new().with(|| RequireAdmin), secret);

    for _ in 0..2 {
        let res = app.handle(Request::new(Method::GET, "/admin")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
    }

    let audit = audit.lock();
    assert!(audit.is_executed());
    assert_eq!(audit.state().seen.len(), 1);
    assert!(audit.state().seen[0].starts_with("root -> "));
}

#[test]
fn dispatch_to_same_listener_twice_is_false_the_second_time() {
    let pending = Pipeline::new(
        RequireAdmin,
        None,
        Kernel::new().into_shared(),
        Arc::new(Controller::new("panel")),
    );
    let mut listener = EventListener::new(Audit::default(), audit_registry());
    let args = pending.arguments();

    assert_eq!(pending.dispatch_event(&mut listener, &args), Ok(true));
    assert_eq!(pending.dispatch_event(&mut listener, &args), Ok(false));
    assert_eq!(listener.state().seen, ["root -> panel"]);
}

#[test]
fn listener_for_another_guard_is_not_reached() {
    let pending = Pipeline::new(
        RequireLogin,
        None,
        Kernel::new().into_shared(),
        Arc::new(Controller::new("panel")),
    );
    let mut listener = EventListener::new(Audit::default(), audit_registry());

    assert_eq!(pending.dispatch_event(&mut listener, &pending.arguments()), Ok(false));
    assert!(!listener.is_executed());
}

#[test]
fn base_identity_entry_is_never_invoked() {
    let registry = ListenerRegistry::new()
        .listen_tag(TypeTag::base(), "on_any_guard")
        .listen::<RequireAdmin>("on_admin")
        .method(Handler::new("on_any_guard", |audit: &mut Audit, _| {
            audit.seen.push("base".to_owned());
            Ok(())
        }))
        .method(Handler::new("on_admin", |audit: &mut Audit, _| {
            audit.seen.push("admin".to_owned());
            Ok(())
        }))
        .into_shared();
    let listener = Arc::new(Mutex::new(EventListener::new(Audit::default(), registry)));
    let kernel = Kernel::new().listener(listener.clone()).into_shared();

    Pipeline::new(RequireAdmin, None, kernel, Arc::new(Controller::new("panel")))
        .activate()
        .unwrap();

    let listener = listener.lock();
    assert!(listener.is_executed());
    assert_eq!(listener.state().seen, ["admin"]);
}

#[test]
fn parameters_bind_by_type_in_any_bag_order() {
    struct Tenant(&'static str);
    impl Typed for Tenant {}

    #[derive(Default)]
    struct Pair(Option<(&'static str, &'static str)>);

    let registry = ListenerRegistry::new()
        .listen::<RequireLogin>("on_login")
        .method(
            Handler::new("on_login", |pair: &mut Pair, args| {
                let user = args.require::<User>("user")?;
                let tenant = args.require::<Tenant>("tenant")?;
                pair.0 = Some((user.name, tenant.0));
                Ok(())
            })
            .param::<User>("user")
            .param::<Tenant>("tenant"),
        )
        .into_shared();
    let mut listener = EventListener::new(Pair::default(), registry);
    let bag = ArgumentBag::new().with(Tenant("acme")).with(User { name: "ana" });

    let dispatched = Dispatcher::new(TypeTag::of::<RequireLogin>()).dispatch_event(&mut listener, &bag);

    assert_eq!(dispatched, Ok(true));
    assert_eq!(listener.state().0, Some(("ana", "acme")));
}

#[test]
fn unsatisfiable_handler_lists_available_types_in_bag_order() {
    let pending = Pipeline::new(
        RequireLogin,
        Some(Arc::new(Request::new(Method::GET, "/"))),
        Kernel::new().into_shared(),
        Arc::new(Controller::new("panel")),
    );
    let registry = ListenerRegistry::new()
        .listen::<RequireLogin>("on_login")
        .method(Handler::new("on_login", |_: &mut Audit, _| Ok(())).param::<User>("user"))
        .into_shared();
    let mut listener = EventListener::new(Audit::default(), registry);

    let err = pending.dispatch_event(&mut listener, &pending.arguments()).unwrap_err();

    let ConfigurationError::UnsatisfiedHandler { handler, trigger, available, .. } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(*handler, "on_login");
    assert_eq!(*trigger, std::any::type_name::<RequireLogin>());
    assert_eq!(
        *available,
        [std::any::type_name::<Request>(), std::any::type_name::<Controller>()]
    );
    assert!(err.to_string().contains("requires more arguments"));
}

#[test]
fn activation_fails_on_unsatisfiable_listener() {
    let registry = ListenerRegistry::new()
        .listen::<RequireLogin>("on_login")
        .method(Handler::new("on_login", |_: &mut Audit, _| Ok(())).param::<User>("user"))
        .into_shared();
    let kernel = Kernel::new()
        .listener(event::shared(EventListener::new(Audit::default(), registry)))
        .into_shared();

    let result = Pipeline::new(RequireLogin, None, kernel, Arc::new(Controller::new("panel")))
        .activate();

    assert!(matches!(result, Err(ConfigurationError::UnsatisfiedHandler { .. })));
}

#[test]
fn execute_without_request_still_applies_policy() {
    let pipeline = Pipeline::new(
        Fixed(Decision::Deny),
        None,
        kernel().into_shared(),
        Arc::new(Controller::new("cron")),
    )
    .activate()
    .unwrap();

    let outcome = pipeline.execute(&Route::new(Method::POST, "/reports")).unwrap();

    let Outcome::Respond(res) = outcome else { panic!("expected a response") };
    assert_eq!(res.location(), Some("/"));
    assert_eq!(res.errors(), ["Kein Zutritt!"]);
}
