//! Message translation.
//!
//! warden only needs two messages translated, but it asks through a trait so
//! the application's own localization layer can answer.

use std::collections::HashMap;

/// Maps a message key to display text.
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> String;
}

/// In-memory translation table. Unknown keys translate to themselves.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(key.into(), message.into());
        self
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str) -> String {
        self.messages.get(key).cloned().unwrap_or_else(|| key.to_owned())
    }
}

impl<F> Translator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}
