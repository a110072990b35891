//! The application kernel guards run against.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::PolicyConfig;
use crate::event::{self, EventListener, SharedListener};
use crate::i18n::{Catalog, Translator};
use crate::policy::ResponsePolicy;

type ListenerFactory = Arc<dyn Fn() -> SharedListener + Send + Sync>;

/// Long-lived application state shared by every guard.
///
/// Holds the listeners events are dispatched to, the denial policy, and the
/// names of the header and footer templates the view layer renders around a
/// page. Guards may swap those templates while deciding a request; warden
/// itself never reads them.
///
/// Listeners come in two lifetimes. [`listener`](Kernel::listener) registers
/// one instance for the whole process: once it has handled an event it stays
/// quiet. [`per_request`](Kernel::per_request) registers a factory, and the
/// router builds a fresh instance from it for every request, so the listener
/// hears each guard once per request.
pub struct Kernel {
    listeners: Vec<SharedListener>,
    factories: Vec<ListenerFactory>,
    policy: ResponsePolicy,
    header_template: RwLock<Option<String>>,
    footer_template: RwLock<Option<String>>,
}

impl Kernel {
    pub fn new() -> Self {
        Self::with_policy(ResponsePolicy::new(PolicyConfig::default(), Arc::new(Catalog::new())))
    }

    pub fn with_policy(policy: ResponsePolicy) -> Self {
        Self {
            listeners: Vec::new(),
            factories: Vec::new(),
            policy,
            header_template: RwLock::new(None),
            footer_template: RwLock::new(None),
        }
    }

    /// Convenience for the common case of only swapping the translator.
    pub fn with_translator(translator: Arc<dyn Translator>) -> Self {
        Self::with_policy(ResponsePolicy::new(PolicyConfig::default(), translator))
    }

    /// Register a listener. Listeners are offered events in registration order.
    pub fn listener(mut self, listener: SharedListener) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Register a listener built anew for every routed request.
    pub fn per_request<L, F>(mut self, factory: F) -> Self
    where
        L: Send + 'static,
        F: Fn() -> EventListener<L> + Send + Sync + 'static,
    {
        self.factories.push(Arc::new(move || event::shared(factory())));
        self
    }

    /// The process-wide listeners. Direct [`Pending::activate`] callers
    /// dispatch to these only.
    ///
    /// [`Pending::activate`]: crate::middleware::Pending::activate
    pub fn listeners(&self) -> &[SharedListener] { &self.listeners }

    /// The listener set for one request: the process-wide listeners, then a
    /// fresh instance from every per-request factory.
    pub fn request_listeners(&self) -> Vec<SharedListener> {
        self.listeners
            .iter()
            .cloned()
            .chain(self.factories.iter().map(|factory| factory()))
            .collect()
    }

    pub fn policy(&self) -> &ResponsePolicy { &self.policy }

    pub fn set_header_template(&self, name: &str) {
        *self.header_template.write() = Some(name.to_owned());
    }

    pub fn set_footer_template(&self, name: &str) {
        *self.footer_template.write() = Some(name.to_owned());
    }

    pub fn header_template(&self) -> Option<String> {
        self.header_template.read().clone()
    }

    pub fn footer_template(&self) -> Option<String> {
        self.footer_template.read().clone()
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for Kernel {
    fn default() -> Self { Self::new() }
}
