//! Record Ports
//!
//! Abstract interface to the persistence layer. One port per `RecordKind`;
//! each call is one atomic write attempt for one record of one client.
//! Implementations live outside this crate (HTTP client, database, ...);
//! `InMemoryRecordPort` is provided for embedding and tests.

mod memory;

pub use memory::{InMemoryRecordPort, RecordedWrite};

use async_trait::async_trait;
use care_records_types::{ClientId, FieldBag, RecordKind};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::PortError;

/// Write access to one record type.
///
/// Implementations must be Send + Sync for use across dispatches. No
/// idempotence is assumed: every call is a fresh write attempt.
#[async_trait]
pub trait RecordPort: Send + Sync {
    /// Create or update the record for `client_id` with `fields`.
    ///
    /// `fields` already carries `client_id` and any defaults.
    async fn write(&self, client_id: &ClientId, fields: &FieldBag) -> Result<(), PortError>;
}

/// Ports keyed by the record they write
#[derive(Clone, Default)]
pub struct PortRegistry {
    ports: HashMap<RecordKind, Arc<dyn RecordPort>>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a port, replacing (and returning) any previous one
    pub fn register(
        &mut self,
        record: RecordKind,
        port: Arc<dyn RecordPort>,
    ) -> Option<Arc<dyn RecordPort>> {
        self.ports.insert(record, port)
    }

    /// Builder-style register
    pub fn with(mut self, record: RecordKind, port: Arc<dyn RecordPort>) -> Self {
        self.register(record, port);
        self
    }

    pub fn get(&self, record: RecordKind) -> Option<Arc<dyn RecordPort>> {
        self.ports.get(&record).cloned()
    }

    pub fn contains(&self, record: RecordKind) -> bool {
        self.ports.contains_key(&record)
    }

    /// Record kinds with no port, in declaration order
    pub fn missing(&self) -> Vec<RecordKind> {
        RecordKind::ALL
            .into_iter()
            .filter(|r| !self.contains(*r))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl std::fmt::Debug for PortRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut registered: Vec<&str> = self.ports.keys().map(RecordKind::as_str).collect();
        registered.sort_unstable();
        f.debug_struct("PortRegistry")
            .field("registered", &registered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_replaces() {
        let first: Arc<dyn RecordPort> = Arc::new(InMemoryRecordPort::new(RecordKind::Note));
        let second: Arc<dyn RecordPort> = Arc::new(InMemoryRecordPort::new(RecordKind::Note));

        let mut registry = PortRegistry::new();
        assert!(registry.register(RecordKind::Note, first).is_none());
        assert!(registry.register(RecordKind::Note, second).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_lists_unregistered() {
        let registry = PortRegistry::new().with(
            RecordKind::Dietary,
            Arc::new(InMemoryRecordPort::new(RecordKind::Dietary)),
        );
        let missing = registry.missing();
        assert_eq!(missing.len(), RecordKind::ALL.len() - 1);
        assert!(!missing.contains(&RecordKind::Dietary));
        assert!(registry.get(RecordKind::Note).is_none());
    }
}
