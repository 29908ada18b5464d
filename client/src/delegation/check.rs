use log::{debug, warn};

use pixelplace_shared::ShardKey;

use crate::{
    delegation::{CheckTicket, DelegationChecker, ShardLockState},
    error::ReplicaError,
    replica::ReplicaHandle,
};

/// Asks the ledger whether `shard` is delegated, unless it is already known
/// unlocked or another check for it is in flight. Returns the lock state the
/// replica holds afterwards.
///
/// Dropping the returned future part way abandons the check, so a later call
/// can retry it.
pub async fn check_delegation(
    replica: &ReplicaHandle,
    checker: &dyn DelegationChecker,
    shard: ShardKey,
) -> Result<ShardLockState, ReplicaError> {
    let ticket = {
        let mut engine = replica.try_engine()?;
        match engine.begin_check(shard) {
            Some(ticket) => ticket,
            None => return Ok(engine.lock_state(&shard)),
        }
    };

    let mut guard = InFlightCheck {
        replica,
        ticket,
        done: false,
    };
    let answer = checker.is_delegated(&shard).await;
    guard.done = true;

    let mut engine = replica.try_engine()?;
    match answer {
        Ok(unlocked) => {
            debug!("shard {} delegated: {}", shard, unlocked);
            engine.complete_check(ticket, unlocked);
            Ok(engine.lock_state(&shard))
        }
        Err(error) => {
            warn!("delegation check of {} failed: {}", shard, error);
            engine.abandon_check(ticket);
            Err(ReplicaError::DelegationCheck {
                shard_x: shard.shard_x(),
                shard_y: shard.shard_y(),
                error,
            })
        }
    }
}

struct InFlightCheck<'a> {
    replica: &'a ReplicaHandle,
    ticket: CheckTicket,
    done: bool,
}

impl Drop for InFlightCheck<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Ok(mut engine) = self.replica.try_engine() {
            engine.abandon_check(self.ticket);
        }
    }
}
