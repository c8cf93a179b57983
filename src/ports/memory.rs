//! In-memory record port
//!
//! Keeps every successful write in a Vec. Failures can be queued ahead of
//! time, and an optional gate holds writes until the caller releases them
//! (for exercising in-flight behaviour).

use async_trait::async_trait;
use care_records_types::{ClientId, FieldBag, RecordKind};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Notify, Semaphore};

use super::RecordPort;
use crate::error::PortError;

/// One write the port accepted
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
    pub client_id: ClientId,
    pub fields: FieldBag,
}

pub struct InMemoryRecordPort {
    record: RecordKind,
    writes: Mutex<Vec<RecordedWrite>>,
    failures: Mutex<VecDeque<PortError>>,
    attempts: AtomicU32,
    entered: Notify,
    gate: Option<Arc<Semaphore>>,
}

impl InMemoryRecordPort {
    pub fn new(record: RecordKind) -> Self {
        Self {
            record,
            writes: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            attempts: AtomicU32::new(0),
            entered: Notify::new(),
            gate: None,
        }
    }

    /// Hold every write until a permit is added to `gate`
    pub fn gated(record: RecordKind, gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(record)
        }
    }

    pub fn record(&self) -> RecordKind {
        self.record
    }

    /// Fail the next write with `error`
    pub fn fail_next(&self, error: PortError) {
        self.fail_times(1, error);
    }

    /// Fail the next `times` writes with `error`
    pub fn fail_times(&self, times: usize, error: PortError) {
        let mut failures = lock(&self.failures);
        failures.extend(std::iter::repeat(error).take(times));
    }

    /// Accepted writes, oldest first
    pub fn writes(&self) -> Vec<RecordedWrite> {
        lock(&self.writes).clone()
    }

    /// Calls made, including failed ones
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Resolves once a write has reached the port
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }
}

#[async_trait]
impl RecordPort for InMemoryRecordPort {
    async fn write(&self, client_id: &ClientId, fields: &FieldBag) -> Result<(), PortError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| PortError::unavailable(format!("{} port shut down", self.record)))?;
            permit.forget();
        }

        if let Some(error) = lock(&self.failures).pop_front() {
            return Err(error);
        }

        lock(&self.writes).push(RecordedWrite {
            client_id: client_id.clone(),
            fields: fields.clone(),
        });
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
