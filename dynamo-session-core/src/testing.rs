//! Test doubles for the session backend.

use crate::backend::{KeyValueBackend, MemoryBackend, StoredSession};
use crate::error::{BackendError, BackendResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::Duration;

/// A call received by [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// `get(id, consistent_read)`
    Get { id: String, consistent_read: bool },
    /// `put(id, payload, expires_at)`
    Put {
        id: String,
        payload: String,
        expires_at: DateTime<Utc>,
    },
    /// `delete(id)`
    Delete { id: String },
}

/// Backend operation, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Put,
    Delete,
}

/// In-memory backend that records every call and can be told to fail.
///
/// Storage is delegated to a [`MemoryBackend`]; recording happens before the
/// injected delay and failure, so failed calls still show up in
/// [`calls`](Self::calls).
#[derive(Debug, Default)]
pub struct MockBackend {
    store: MemoryBackend,
    calls: Mutex<Vec<BackendCall>>,
    failures: Mutex<Vec<(Operation, BackendError)>>,
    delay: Mutex<Option<Duration>>,
}

impl MockBackend {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an item as if it had been written earlier.
    pub async fn seed(&self, item: StoredSession) {
        self.store.insert(item).await;
    }

    /// Make every call of `operation` fail with `error`.
    pub fn fail(&self, operation: Operation, error: BackendError) {
        let mut failures = self.failures.lock();
        failures.retain(|(op, _)| *op != operation);
        failures.push((operation, error));
    }

    /// Delay every call by `delay` before answering.
    pub fn delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    /// Recorded `get` calls.
    pub fn gets(&self) -> Vec<BackendCall> {
        self.filtered(|c| matches!(c, BackendCall::Get { .. }))
    }

    /// Recorded `put` calls.
    pub fn puts(&self) -> Vec<BackendCall> {
        self.filtered(|c| matches!(c, BackendCall::Put { .. }))
    }

    /// Recorded `delete` calls.
    pub fn deletes(&self) -> Vec<BackendCall> {
        self.filtered(|c| matches!(c, BackendCall::Delete { .. }))
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// The underlying store.
    pub fn store(&self) -> &MemoryBackend {
        &self.store
    }

    fn filtered(&self, keep: impl Fn(&BackendCall) -> bool) -> Vec<BackendCall> {
        self.calls.lock().iter().filter(|c| keep(c)).cloned().collect()
    }

    async fn enter(&self, call: BackendCall, operation: Operation) -> BackendResult<()> {
        self.calls.lock().push(call);

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .failures
            .lock()
            .iter()
            .find(|(op, _)| *op == operation)
            .map(|(_, err)| err.clone());
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl KeyValueBackend for MockBackend {
    async fn get(&self, id: &str, consistent_read: bool) -> BackendResult<Option<StoredSession>> {
        let call = BackendCall::Get {
            id: id.to_string(),
            consistent_read,
        };
        self.enter(call, Operation::Get).await?;
        self.store.get(id, consistent_read).await
    }

    async fn put(&self, id: &str, payload: &str, expires_at: DateTime<Utc>) -> BackendResult<()> {
        let call = BackendCall::Put {
            id: id.to_string(),
            payload: payload.to_string(),
            expires_at,
        };
        self.enter(call, Operation::Put).await?;
        self.store.put(id, payload, expires_at).await
    }

    async fn delete(&self, id: &str) -> BackendResult<()> {
        let call = BackendCall::Delete { id: id.to_string() };
        self.enter(call, Operation::Delete).await?;
        self.store.delete(id).await
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
