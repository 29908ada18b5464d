use crate::{ColorIndex, EntryId, GlobalPixel, Pubkey, ShardKey, Timestamp};

/// A pixel was painted (color 1-255) or erased (color 0).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelEvent {
    pub pixel: GlobalPixel,
    pub color: ColorIndex,
    /// Session key that signed the write
    pub painter: Pubkey,
    /// Main wallet the write is attributed to
    pub actor: Pubkey,
    pub timestamp: Timestamp,
    pub entry_id: EntryId,
    /// Position of the event among the events of its entry
    pub event_index: u16,
}

impl PixelEvent {
    pub fn is_erase(&self) -> bool {
        self.color == crate::constants::COLOR_UNSET
    }
}

/// A shard account was created on the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardEvent {
    pub shard: ShardKey,
    /// Who paid for the shard
    pub creator: Pubkey,
    pub actor: Pubkey,
    pub timestamp: Timestamp,
    pub entry_id: EntryId,
    pub event_index: u16,
}

/// The closed set of events the canvas program emits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainEvent {
    PixelChanged(PixelEvent),
    ShardInitialized(ShardEvent),
}

impl DomainEvent {
    pub fn entry_id(&self) -> &EntryId {
        match self {
            DomainEvent::PixelChanged(event) => &event.entry_id,
            DomainEvent::ShardInitialized(event) => &event.entry_id,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            DomainEvent::PixelChanged(event) => event.timestamp,
            DomainEvent::ShardInitialized(event) => event.timestamp,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::PixelChanged(_) => "PixelChanged",
            DomainEvent::ShardInitialized(_) => "ShardInitialized",
        }
    }
}
