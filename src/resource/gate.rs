//! Serialization Gate
//!
//! Heroku cannot process two add-on provisioning requests for the same
//! account at once. Each account gets one gate, and add-on creation runs
//! while holding it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};

/// Mutual exclusion section for one account
#[derive(Debug, Default)]
pub struct SerializationGate {
    scope: String,
    lock: AsyncMutex<()>,
}

/// Held while inside the gate; leaving scope releases it
#[derive(Debug)]
pub struct GatePass<'a> {
    scope: &'a str,
    _guard: MutexGuard<'a, ()>,
}

impl SerializationGate {
    pub fn new(scope: &str) -> Self {
        Self {
            scope: scope.to_string(),
            lock: AsyncMutex::new(()),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Wait until the gate is free and enter it
    pub async fn enter(&self) -> GatePass<'_> {
        let guard = self.lock.lock().await;
        tracing::trace!("Entered gate for {}", self.scope);
        GatePass {
            scope: &self.scope,
            _guard: guard,
        }
    }
}

impl Drop for GatePass<'_> {
    fn drop(&mut self) {
        tracing::trace!("Left gate for {}", self.scope);
    }
}

/// Hands out one gate per account identity
#[derive(Debug, Default)]
pub struct GateRegistry {
    gates: Mutex<HashMap<String, Arc<SerializationGate>>>,
}

impl GateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate shared by every caller using the same account
    pub fn gate_for(&self, account: &str) -> Arc<SerializationGate> {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        gates
            .entry(account.to_string())
            .or_insert_with(|| Arc::new(SerializationGate::new(account)))
            .clone()
    }
}
