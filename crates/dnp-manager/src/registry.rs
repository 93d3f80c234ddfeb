use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::entity::EntityKind;
use crate::error::{ManagerError, Result};
use crate::handler::Handler;

type Table = HashMap<EntityKind, HashMap<u16, Handler>>;

/// Thread-safe table of handlers keyed by entity kind and id.
///
/// Lookups clone the handler out under the read lock, so handlers always run
/// with the lock released.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: RwLock<Table>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing and returning any previous one.
    pub fn add(&self, kind: EntityKind, id: u16, handler: Handler) -> Option<Handler> {
        debug!(%kind, id, shape = handler.shape(), "handler registered");
        self.write().entry(kind).or_default().insert(id, handler)
    }

    /// Register by kind name, failing on names outside the hierarchy.
    pub fn add_named(&self, kind: &str, id: u16, handler: Handler) -> Result<Option<Handler>> {
        let kind: EntityKind = kind.parse()?;
        Ok(self.add(kind, id, handler))
    }

    /// Unregister a handler. Missing entries are ignored.
    pub fn remove(&self, kind: EntityKind, id: u16) -> Option<Handler> {
        let removed = self.write().get_mut(&kind)?.remove(&id);
        if removed.is_some() {
            debug!(%kind, id, "handler removed");
        }
        removed
    }

    pub fn get(&self, kind: EntityKind, id: u16) -> Result<Handler> {
        self.read()
            .get(&kind)
            .and_then(|handlers| handlers.get(&id))
            .cloned()
            .ok_or(ManagerError::HandlerNotFound { kind, id })
    }

    pub fn contains(&self, kind: EntityKind, id: u16) -> bool {
        self.read()
            .get(&kind)
            .is_some_and(|handlers| handlers.contains_key(&id))
    }

    /// Total number of registered handlers across all kinds.
    pub fn len(&self) -> usize {
        self.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered `(kind, id)` pairs, sorted.
    pub fn keys(&self) -> Vec<(EntityKind, u16)> {
        let mut keys: Vec<_> = self
            .read()
            .iter()
            .flat_map(|(kind, handlers)| handlers.keys().map(move |id| (*kind, *id)))
            .collect();
        keys.sort_unstable();
        keys
    }

    // A panicking handler never holds the lock, so a poisoned table is still consistent.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Table> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Table> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use serde_json::Value;

    use super::*;

    fn constant(value: bool) -> Handler {
        Handler::trigger(move || Ok(Value::Bool(value)))
    }

    #[test]
    fn add_overwrites_existing_entry() {
        let registry = HandlerRegistry::new();
        assert!(registry.add(EntityKind::Resource, 1, constant(false)).is_none());
        assert!(registry.add(EntityKind::Resource, 1, constant(true)).is_some());

        let handler = registry.get(EntityKind::Resource, 1).unwrap();
        assert_eq!(handler.invoke(b"").unwrap(), Value::Bool(true));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn kinds_are_separate_namespaces() {
        let registry = HandlerRegistry::new();
        registry.add(EntityKind::Component, 7, constant(true));
        assert!(registry.contains(EntityKind::Component, 7));
        assert!(!registry.contains(EntityKind::Resource, 7));
    }

    #[test]
    fn lookup_miss_is_not_found() {
        let registry = HandlerRegistry::new();
        assert!(matches!(
            registry.get(EntityKind::Service, 3),
            Err(ManagerError::HandlerNotFound {
                kind: EntityKind::Service,
                id: 3
            })
        ));
    }

    #[test]
    fn remove_missing_is_noop() {
        let registry = HandlerRegistry::new();
        assert!(registry.remove(EntityKind::Resource, 1).is_none());
        registry.add(EntityKind::Resource, 1, constant(true));
        assert!(registry.remove(EntityKind::Resource, 1).is_some());
        assert!(registry.remove(EntityKind::Resource, 1).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn add_named_rejects_unknown_kind() {
        let registry = HandlerRegistry::new();
        assert!(matches!(
            registry.add_named("widget", 1, constant(true)),
            Err(ManagerError::UnsupportedEntity(name)) if name == "widget"
        ));
        registry.add_named("component", 2, constant(true)).unwrap();
        assert_eq!(registry.keys(), vec![(EntityKind::Component, 2)]);
    }

    #[test]
    fn concurrent_add_and_get() {
        let registry = Arc::new(HandlerRegistry::new());
        let writers: Vec<_> = (0..4u16)
            .map(|n| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for id in 0..50u16 {
                        registry.add(EntityKind::Resource, n * 100 + id, constant(true));
                        let _ = registry.get(EntityKind::Resource, n * 100);
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(registry.len(), 200);
    }
}
