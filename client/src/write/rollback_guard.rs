use log::debug;

use pixelplace_shared::Timestamp;

use crate::replica::{PendingWrite, ReplicaHandle};

/// Rolls an optimistic write back unless it is confirmed first.
///
/// Covers every exit path of a write task: an error return, a timeout, or
/// the task being cancelled.
pub(crate) struct RollbackGuard {
    replica: ReplicaHandle,
    write: Option<PendingWrite>,
}

impl RollbackGuard {
    pub(crate) fn new(replica: ReplicaHandle, write: PendingWrite) -> Self {
        Self {
            replica,
            write: Some(write),
        }
    }

    pub(crate) fn confirm(mut self, timestamp: Timestamp) {
        if let Some(write) = self.write.take() {
            if let Ok(mut engine) = self.replica.try_engine() {
                engine.confirm_write(write, timestamp);
            }
        }
    }
}

impl Drop for RollbackGuard {
    fn drop(&mut self) {
        let Some(write) = self.write.take() else {
            return;
        };
        if let Ok(mut engine) = self.replica.try_engine() {
            if engine.rollback_write(write) {
                debug!("rolled back optimistic write {}", write.id());
            }
        }
    }
}
