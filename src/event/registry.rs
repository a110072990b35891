//! Listener registries and handler descriptors.
//!
//! A listener type `L` describes itself once, in a [`ListenerRegistry<L>`]:
//!
//! - which middleware types it listens to, each mapped to a handler method
//!   name (`listen::<M>("on_login")`)
//! - the handler methods themselves, each with ordered typed parameters
//!
//! The registry is shared (`Arc`) between every [`EventListener<L>`]
//! instance; the once-only `executed` flag lives on the instance.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConfigurationError;
use crate::event::argument::{TypeTag, Typed};
use crate::event::resolver::Bound;

/// Boxed handler body. Receives the listener state and the bound parameters.
type HandlerFn<L> =
    Box<dyn Fn(&mut L, &Bound<'_>) -> Result<(), ConfigurationError> + Send + Sync + 'static>;

/// One declared handler parameter.
#[derive(Clone, Copy, Debug)]
pub struct Param {
    pub name: &'static str,
    pub tag: TypeTag,
    pub required: bool,
}

/// A named handler method with its declared parameter list.
pub struct Handler<L> {
    name: &'static str,
    params: Vec<Param>,
    call: HandlerFn<L>,
}

impl<L> Handler<L> {
    pub fn new<F>(name: &'static str, call: F) -> Self
    where
        F: Fn(&mut L, &Bound<'_>) -> Result<(), ConfigurationError> + Send + Sync + 'static,
    {
        Self { name, params: Vec::new(), call: Box::new(call) }
    }

    /// Declare a required parameter of type `T`.
    pub fn param<T: Typed>(mut self, name: &'static str) -> Self {
        self.params.push(Param { name, tag: TypeTag::of::<T>(), required: true });
        self
    }

    /// Declare a parameter that may stay unbound.
    pub fn optional<T: Typed>(mut self, name: &'static str) -> Self {
        self.params.push(Param { name, tag: TypeTag::of::<T>(), required: false });
        self
    }

    pub fn name(&self) -> &'static str { self.name }
    pub fn params(&self) -> &[Param] { &self.params }

    pub(crate) fn invoke(&self, listener: &mut L, bound: &Bound<'_>) -> Result<(), ConfigurationError> {
        (self.call)(listener, bound)
    }
}

/// What a listener type listens to, and how it handles it.
pub struct ListenerRegistry<L> {
    entries: Vec<(TypeTag, &'static str)>,
    methods: HashMap<&'static str, Handler<L>>,
}

impl<L> ListenerRegistry<L> {
    pub fn new() -> Self {
        Self { entries: Vec::new(), methods: HashMap::new() }
    }

    /// Map the middleware type `M` to the handler method `handler`.
    ///
    /// Registering `M` twice keeps the original position and replaces the
    /// handler name.
    pub fn listen<M: 'static>(self, handler: &'static str) -> Self {
        self.listen_tag(TypeTag::of::<M>(), handler)
    }

    /// Map an arbitrary trigger identity, e.g. [`TypeTag::base`].
    pub fn listen_tag(mut self, trigger: TypeTag, handler: &'static str) -> Self {
        match self.entries.iter_mut().find(|(t, _)| *t == trigger) {
            Some(entry) => entry.1 = handler,
            None => self.entries.push((trigger, handler)),
        }
        self
    }

    /// Declare a handler method.
    pub fn method(mut self, handler: Handler<L>) -> Self {
        self.methods.insert(handler.name, handler);
        self
    }

    pub fn listens_to(&self, trigger: &TypeTag) -> bool {
        self.entries.iter().any(|(t, _)| t == trigger)
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[(TypeTag, &'static str)] {
        &self.entries
    }

    pub fn handler(&self, name: &str) -> Option<&Handler<L>> {
        self.methods.get(name)
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl<L> Default for ListenerRegistry<L> {
    fn default() -> Self { Self::new() }
}

// ── EventListener ─────────────────────────────────────────────────────────────

/// A listener instance: user state, its type's registry, and the once-only
/// flag.
pub struct EventListener<L> {
    state: L,
    registry: Arc<ListenerRegistry<L>>,
    executed: bool,
}

impl<L: Send + 'static> EventListener<L> {
    pub fn new(state: L, registry: Arc<ListenerRegistry<L>>) -> Self {
        Self { state, registry, executed: false }
    }

    pub fn state(&self) -> &L { &self.state }
    pub fn state_mut(&mut self) -> &mut L { &mut self.state }
    pub fn registry(&self) -> &ListenerRegistry<L> { &self.registry }

    pub(crate) fn parts(&mut self) -> (&mut L, &ListenerRegistry<L>) {
        (&mut self.state, &self.registry)
    }
}

/// Object-safe view of an [`EventListener`], so listeners of different types
/// can share one collection.
pub trait Subscriber: Send {
    fn listener_name(&self) -> &'static str;
    fn is_executed(&self) -> bool;
    fn listens_to(&self, trigger: &TypeTag) -> bool;

    #[doc(hidden)]
    fn mark_executed(&mut self);

    #[doc(hidden)]
    fn deliver(
        &mut self,
        trigger: TypeTag,
        args: &crate::event::ArgumentBag,
    ) -> Result<(), ConfigurationError>;
}

impl<L: Send + 'static> Subscriber for EventListener<L> {
    fn listener_name(&self) -> &'static str {
        std::any::type_name::<L>()
    }

    fn is_executed(&self) -> bool { self.executed }

    fn listens_to(&self, trigger: &TypeTag) -> bool {
        self.registry.listens_to(trigger)
    }

    fn mark_executed(&mut self) {
        self.executed = true;
    }

    fn deliver(
        &mut self,
        trigger: TypeTag,
        args: &crate::event::ArgumentBag,
    ) -> Result<(), ConfigurationError> {
        crate::event::dispatcher::deliver(self, trigger, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Audit;
    struct Auth;
    struct Admin;

    #[test]
    fn relisten_replaces_handler_in_place() {
        let registry: ListenerRegistry<Audit> = ListenerRegistry::new()
            .listen::<Auth>("first")
            .listen::<Admin>("admin")
            .listen::<Auth>("second");

        let names: Vec<_> = registry.entries().iter().map(|(_, h)| *h).collect();
        assert_eq!(names, ["second", "admin"]);
        assert!(registry.listens_to(&TypeTag::of::<Admin>()));
        assert!(!registry.listens_to(&TypeTag::of::<Audit>()));
    }

    #[test]
    fn fresh_listener_is_not_executed() {
        let registry = ListenerRegistry::<Audit>::new().listen::<Auth>("on_auth").into_shared();
        let listener = EventListener::new(Audit, registry);
        assert!(!listener.is_executed());
        assert!(listener.listener_name().ends_with("Audit"));
    }
}
