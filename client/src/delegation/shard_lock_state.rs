/// What the replica believes about a shard's delegation.
///
/// `Unknown -> Checking -> {Locked, Unlocked}`. Unlocked only goes back to
/// Locked on an explicit undelegate event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShardLockState {
    Unknown,
    Checking,
    Locked,
    Unlocked,
}

impl ShardLockState {
    pub fn is_locked(&self) -> bool {
        !matches!(self, ShardLockState::Unlocked)
    }
}
