use std::sync::{Arc, Mutex, MutexGuard};

use crate::{error::ReplicaError, replica::sync_engine::ReplicaSyncEngine};

/// Shared handle to the replica. The lock is never held across an await.
#[derive(Clone)]
pub struct ReplicaHandle {
    engine: Arc<Mutex<ReplicaSyncEngine>>,
}

impl ReplicaHandle {
    pub fn new(engine: ReplicaSyncEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Locks the replica (panicking version)
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_engine` for non-panicking error handling.
    pub fn engine(&self) -> MutexGuard<'_, ReplicaSyncEngine> {
        self.try_engine()
            .expect("Lock on ReplicaSyncEngine is poisoned")
    }

    /// Locks the replica (non-panicking version)
    ///
    /// Returns an error if the lock is poisoned.
    pub fn try_engine(&self) -> Result<MutexGuard<'_, ReplicaSyncEngine>, ReplicaError> {
        self.engine.lock().map_err(|_| ReplicaError::Poisoned)
    }
}
