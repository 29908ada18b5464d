use crate::{EntryId, Slot, SourceLabel, Timestamp};

/// One ledger entry as delivered by a source, before decoding.
///
/// Live notifications and history pages share this shape. `logs` are the raw
/// program log lines; domain events are extracted from them at the boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawLogBatch {
    pub source: SourceLabel,
    pub entry_id: EntryId,
    pub slot: Slot,
    pub block_time: Option<Timestamp>,
    /// The entry failed on the ledger; it carries no events
    pub failed: bool,
    pub logs: Vec<String>,
}

impl RawLogBatch {
    pub fn new(source: SourceLabel, entry_id: EntryId, slot: Slot, logs: Vec<String>) -> Self {
        Self {
            source,
            entry_id,
            slot,
            block_time: None,
            failed: false,
            logs,
        }
    }
}
