//! Shared test fixtures: a dispatcher wired to one in-memory port per record
//! kind and a notifier that keeps everything it is handed.

#![allow(dead_code)]

use care_records::types::RecordKind;
use care_records::{
    DispatcherConfig, InMemoryRecordPort, Notification, Notifier, PortRegistry, SaveDispatcher,
    SessionHandle,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn successes(&self) -> usize {
        self.all().iter().filter(|n| n.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.all().iter().filter(|n| !n.is_success()).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

pub struct Harness {
    pub dispatcher: Arc<SaveDispatcher>,
    pub session: SessionHandle,
    pub notes: Arc<RecordingNotifier>,
    ports: HashMap<RecordKind, Arc<InMemoryRecordPort>>,
}

impl Harness {
    /// Every record kind gets an ungated in-memory port
    pub fn new(config: DispatcherConfig) -> Self {
        Self::build(config, &RecordKind::ALL, &[], None)
    }

    /// Ports for every record kind except `missing`
    pub fn without(config: DispatcherConfig, missing: &[RecordKind]) -> Self {
        Self::build(config, &RecordKind::ALL, missing, None)
    }

    /// Ports for `gated` only release writes when `gate` gets permits
    pub fn gated(config: DispatcherConfig, gated: &[RecordKind], gate: Arc<Semaphore>) -> Self {
        let mut harness = Self::build(config.clone(), &RecordKind::ALL, gated, None);
        let gated_harness = Self::build(config, gated, &[], Some(gate));
        for (record, port) in gated_harness.ports {
            harness.ports.insert(record, port);
        }
        harness.rebuild_dispatcher();
        harness
    }

    fn build(
        config: DispatcherConfig,
        kinds: &[RecordKind],
        missing: &[RecordKind],
        gate: Option<Arc<Semaphore>>,
    ) -> Self {
        init_tracing();
        let ports: HashMap<_, _> = kinds
            .iter()
            .filter(|k| !missing.contains(k))
            .map(|k| {
                let port = match &gate {
                    Some(gate) => InMemoryRecordPort::gated(*k, gate.clone()),
                    None => InMemoryRecordPort::new(*k),
                };
                (*k, Arc::new(port))
            })
            .collect();

        let session = SessionHandle::mount();
        let notes = Arc::new(RecordingNotifier::default());
        let dispatcher = Arc::new(
            SaveDispatcher::new(registry(&ports), session.clone(), notes.clone())
                .with_config(config),
        );
        Self {
            dispatcher,
            session,
            notes,
            ports,
        }
    }

    fn rebuild_dispatcher(&mut self) {
        let config = self.dispatcher.config().clone();
        self.dispatcher = Arc::new(
            SaveDispatcher::new(registry(&self.ports), self.session.clone(), self.notes.clone())
                .with_config(config),
        );
    }

    pub fn port(&self, record: RecordKind) -> Arc<InMemoryRecordPort> {
        self.ports
            .get(&record)
            .cloned()
            .unwrap_or_else(|| panic!("no port for {record}"))
    }

    /// Total accepted writes across every port
    pub fn total_writes(&self) -> usize {
        self.ports.values().map(|p| p.writes().len()).sum()
    }
}

fn registry(ports: &HashMap<RecordKind, Arc<InMemoryRecordPort>>) -> PortRegistry {
    ports.iter().fold(PortRegistry::new(), |registry, (record, port)| {
        registry.with(*record, port.clone())
    })
}
