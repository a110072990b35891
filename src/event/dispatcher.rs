//! Once-only delivery of lifecycle arguments to listeners.

use tracing::debug;

use crate::error::ConfigurationError;
use crate::event::argument::{ArgumentBag, TypeTag};
use crate::event::registry::{EventListener, Subscriber};
use crate::event::resolver::{resolve, unbound_required};
use crate::event::SharedListener;

/// Dispatches on behalf of one triggering middleware type.
#[derive(Clone, Copy, Debug)]
pub struct Dispatcher {
    trigger: TypeTag,
}

impl Dispatcher {
    pub fn new(trigger: TypeTag) -> Self {
        Self { trigger }
    }

    pub fn trigger(&self) -> TypeTag { self.trigger }

    /// Deliver `args` to one listener.
    ///
    /// Returns `Ok(false)` without touching the listener if it already ran,
    /// or if it has no entry for the exact trigger type. Registration is per
    /// concrete middleware type; a listener keyed on a different middleware
    /// is not reached through some shared supertype.
    ///
    /// Otherwise every registry entry except the one keyed by
    /// [`TypeTag::base`] is handled, the listener is marked executed, and
    /// `Ok(true)` is returned. On error the listener stays unmarked, and the
    /// handlers of entries before the failing one have already run; a later
    /// dispatch runs them again.
    pub fn dispatch_event(
        &self,
        listener: &mut dyn Subscriber,
        args: &ArgumentBag,
    ) -> Result<bool, ConfigurationError> {
        if listener.is_executed() || !listener.listens_to(&self.trigger) {
            return Ok(false);
        }

        listener.deliver(self.trigger, args)?;
        listener.mark_executed();

        debug!(
            middleware = self.trigger.name(),
            listener = listener.listener_name(),
            "listener dispatched"
        );
        Ok(true)
    }

    /// Dispatch to each listener in turn, locking one at a time. Returns how
    /// many listeners actually ran.
    pub fn dispatch_all(
        &self,
        listeners: &[SharedListener],
        args: &ArgumentBag,
    ) -> Result<usize, ConfigurationError> {
        let mut delivered = 0;
        for listener in listeners {
            if self.dispatch_event(&mut *listener.lock(), args)? {
                delivered += 1;
            }
        }
        Ok(delivered)
    }
}

/// Run every non-base registry entry of `listener` against `args`.
pub(crate) fn deliver<L: Send + 'static>(
    listener: &mut EventListener<L>,
    trigger: TypeTag,
    args: &ArgumentBag,
) -> Result<(), ConfigurationError> {
    let listener_name = listener.listener_name();
    let base = TypeTag::base();
    let (state, registry) = listener.parts();

    for &(middleware, method) in registry.entries() {
        if middleware == base {
            continue;
        }

        let handler = registry.handler(method).ok_or(ConfigurationError::HandlerNotFound {
            handler: method,
            listener: listener_name,
        })?;

        let bound = resolve(handler.params(), args);
        if unbound_required(handler.params(), &bound).is_some() {
            return Err(ConfigurationError::UnsatisfiedHandler {
                handler: handler.name(),
                listener: listener_name,
                middleware: middleware.name(),
                trigger: trigger.name(),
                available: args.type_names(),
            });
        }

        handler.invoke(state, &bound)?;
    }

    Ok(())
}
