use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::error::{ManagerError, Result};

/// Error a handler reports back to the manager.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A handler's dynamic result. Only `Value::Bool(true)` counts as success.
pub type HandlerResult = std::result::Result<Value, HandlerError>;

/// A handler that receives the request payload.
pub trait Handle: Send + Sync {
    fn handle(&self, payload: &[u8]) -> HandlerResult;
}

impl<F> Handle for F
where
    F: Fn(&[u8]) -> HandlerResult + Send + Sync,
{
    fn handle(&self, payload: &[u8]) -> HandlerResult {
        self(payload)
    }
}

/// A registered handler, in one of two shapes fixed at registration.
#[derive(Clone)]
pub enum Handler {
    /// Runs without arguments; the payload is not forwarded.
    Trigger(Arc<dyn Fn() -> HandlerResult + Send + Sync>),
    /// Receives the payload.
    Request(Arc<dyn Handle>),
}

impl Handler {
    pub fn trigger<F>(f: F) -> Self
    where
        F: Fn() -> HandlerResult + Send + Sync + 'static,
    {
        Handler::Trigger(Arc::new(f))
    }

    pub fn request<H>(handler: H) -> Self
    where
        H: Handle + 'static,
    {
        Handler::Request(Arc::new(handler))
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Handler::Trigger(_) => "trigger",
            Handler::Request(_) => "request",
        }
    }

    pub fn invoke(&self, payload: &[u8]) -> HandlerResult {
        match self {
            Handler::Trigger(f) => f(),
            Handler::Request(handler) => handler.handle(payload),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.shape()).finish()
    }
}

/// Handlers addressable by name, used when configuration refers to
/// handler functions by reference.
#[derive(Debug, Clone, Default)]
pub struct HandlerCatalog {
    entries: BTreeMap<String, Handler>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog shipped with the server.
    ///
    /// - `print` logs the payload and succeeds.
    /// - `ack` succeeds without looking at the payload.
    /// - `reject` always answers `false`.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert("print", Handler::request(print_payload));
        catalog.insert("ack", Handler::trigger(|| Ok(Value::Bool(true))));
        catalog.insert("reject", Handler::trigger(|| Ok(Value::Bool(false))));
        catalog
    }

    /// Add or replace a named handler, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, handler: Handler) -> Option<Handler> {
        self.entries.insert(name.into(), handler)
    }

    /// Resolve a name, failing with [`ManagerError::InvalidHandler`].
    pub fn resolve(&self, name: &str) -> Result<Handler> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| ManagerError::InvalidHandler(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn print_payload(payload: &[u8]) -> HandlerResult {
    info!(
        len = payload.len(),
        payload = %String::from_utf8_lossy(payload),
        "payload received"
    );
    Ok(Value::Bool(true))
}
