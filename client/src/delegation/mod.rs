mod check;
mod delegation_cache;
mod delegation_checker;
mod shard_lock_state;

pub use check::check_delegation;
pub use delegation_cache::{CheckTicket, DelegationStatusCache};
pub use delegation_checker::{AccountOwnerSource, DelegationChecker, OwnerDelegationChecker};
pub use shard_lock_state::ShardLockState;
