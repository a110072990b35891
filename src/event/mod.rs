//! Lifecycle events raised by guards.
//!
//! When a guard is activated, every listener the kernel knows about is offered
//! the guard's arguments (the request, the controller, and whatever the
//! middleware contributes). A listener reacts only if it registered the exact
//! middleware type, and only once per listener instance.
//!
//! ```rust
//! use warden::event::{EventListener, Handler, ListenerRegistry, Typed};
//! # struct RequireLogin;
//!
//! struct User { name: String }
//! impl Typed for User {}
//!
//! #[derive(Default)]
//! struct Greeter { greeted: Vec<String> }
//!
//! let registry = ListenerRegistry::new()
//!     .listen::<RequireLogin>("on_login")
//!     .method(
//!         Handler::new("on_login", |g: &mut Greeter, args| {
//!             let user = args.require::<User>("user")?;
//!             g.greeted.push(user.name.clone());
//!             Ok(())
//!         })
//!         .param::<User>("user"),
//!     )
//!     .into_shared();
//!
//! let listener = EventListener::new(Greeter::default(), registry);
//! ```

mod argument;
mod dispatcher;
mod registry;
mod resolver;

use std::sync::Arc;

use parking_lot::Mutex;

pub use argument::{Argument, ArgumentBag, AsAny, TypeTag, Typed};
pub use dispatcher::Dispatcher;
pub use registry::{EventListener, Handler, ListenerRegistry, Param, Subscriber};
pub use resolver::{Bound, resolve, unbound_required};

/// A listener shared between requests.
pub type SharedListener = Arc<Mutex<dyn Subscriber>>;

/// Wrap a listener for registration on a [`Kernel`](crate::Kernel).
pub fn shared<L: Send + 'static>(listener: EventListener<L>) -> SharedListener {
    Arc::new(Mutex::new(listener))
}
