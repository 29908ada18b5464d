use std::collections::{HashMap, HashSet};

use log::debug;

use pixelplace_shared::ShardKey;

use crate::delegation::shard_lock_state::ShardLockState;

/// Proof of a registered delegation check. Only the check that currently
/// owns the shard's in-flight slot can resolve it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckTicket {
    shard: ShardKey,
    generation: u64,
}

impl CheckTicket {
    pub fn shard(&self) -> ShardKey {
        self.shard
    }
}

/// Which shards are known to be delegated, and which are being checked.
///
/// The in-flight set is explicit: a shard already being checked is never
/// checked a second time until the first check completes or is abandoned.
/// Each check holds a [`CheckTicket`]; an answer arriving after its slot was
/// abandoned and handed to a newer check is ignored.
pub struct DelegationStatusCache {
    known_unlocked: HashSet<ShardKey>,
    known_locked: HashSet<ShardKey>,
    in_flight: HashMap<ShardKey, u64>,
    next_generation: u64,
}

impl DelegationStatusCache {
    pub fn new() -> Self {
        Self {
            known_unlocked: HashSet::new(),
            known_locked: HashSet::new(),
            in_flight: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn is_locked(&self, shard: &ShardKey) -> bool {
        !self.known_unlocked.contains(shard)
    }

    pub fn lock_state(&self, shard: &ShardKey) -> ShardLockState {
        if self.known_unlocked.contains(shard) {
            ShardLockState::Unlocked
        } else if self.in_flight.contains_key(shard) {
            ShardLockState::Checking
        } else if self.known_locked.contains(shard) {
            ShardLockState::Locked
        } else {
            ShardLockState::Unknown
        }
    }

    /// Registers a check for `shard`. Returns `None` when no round-trip is
    /// needed: the shard is already unlocked or a check is in flight.
    pub fn begin_check(&mut self, shard: ShardKey) -> Option<CheckTicket> {
        if self.known_unlocked.contains(&shard) || self.in_flight.contains_key(&shard) {
            return None;
        }
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        self.in_flight.insert(shard, generation);
        Some(CheckTicket { shard, generation })
    }

    /// Records the answer of the check holding `ticket`. Returns false, and
    /// records nothing, when the ticket no longer owns the in-flight slot.
    pub fn complete_check(&mut self, ticket: CheckTicket, unlocked: bool) -> bool {
        if !self.release(ticket) {
            debug!("ignoring stale delegation answer for {}", ticket.shard);
            return false;
        }
        if unlocked {
            self.mark_unlocked(ticket.shard);
        } else if !self.known_unlocked.contains(&ticket.shard) {
            self.known_locked.insert(ticket.shard);
        }
        true
    }

    /// Drops the check holding `ticket` without an answer
    pub fn abandon_check(&mut self, ticket: CheckTicket) -> bool {
        self.release(ticket)
    }

    fn release(&mut self, ticket: CheckTicket) -> bool {
        if self.in_flight.get(&ticket.shard) != Some(&ticket.generation) {
            return false;
        }
        self.in_flight.remove(&ticket.shard);
        true
    }

    /// Drops every in-flight check. Used on teardown.
    pub fn abandon_all(&mut self) {
        if !self.in_flight.is_empty() {
            debug!("abandoning {} delegation checks", self.in_flight.len());
        }
        self.in_flight.clear();
    }

    pub fn is_checking(&self, shard: &ShardKey) -> bool {
        self.in_flight.contains_key(shard)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn mark_unlocked(&mut self, shard: ShardKey) {
        self.known_locked.remove(&shard);
        self.known_unlocked.insert(shard);
    }

    /// The only way a shard leaves the unlocked set
    pub fn mark_undelegated(&mut self, shard: ShardKey) {
        self.known_unlocked.remove(&shard);
        self.known_locked.insert(shard);
    }

    pub fn clear(&mut self) {
        self.known_unlocked.clear();
        self.known_locked.clear();
        self.in_flight.clear();
    }
}

impl Default for DelegationStatusCache {
    fn default() -> Self {
        Self::new()
    }
}
