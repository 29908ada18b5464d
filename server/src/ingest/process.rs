use log::{debug, warn};

use pixelplace_shared::{decode_entry, DecodeError, RawLogBatch};

use crate::index::{ApplyOutcome, EntryBatch, IndexError, PersistentIndex, SyncCursor};

/// What happened to one raw entry
#[derive(Debug)]
pub enum EntryOutcome {
    Applied(ApplyOutcome),
    /// The logs did not decode; nothing was written and the entry stays
    /// unprocessed
    Malformed(DecodeError),
}

/// Decodes and applies one raw entry. When `advance_cursor` is set the
/// source's cursor moves to this entry in the same transaction.
pub fn process_entry(
    index: &mut PersistentIndex,
    raw: &RawLogBatch,
    advance_cursor: bool,
) -> Result<EntryOutcome, IndexError> {
    let cursor = SyncCursor::new(raw.entry_id.clone(), raw.slot);

    let events = match decode_entry(raw) {
        Ok(events) => events,
        Err(error) => {
            warn!(
                "skipping malformed entry {} from {}: {}",
                raw.entry_id, raw.source, error
            );
            if advance_cursor {
                index.advance_cursor(raw.source, &cursor)?;
            }
            return Ok(EntryOutcome::Malformed(error));
        }
    };

    let batch = EntryBatch {
        source: raw.source,
        entry_id: &raw.entry_id,
        slot: raw.slot,
        failed: raw.failed,
        events: &events,
    };
    let outcome = index.apply_entry(&batch, advance_cursor.then_some(&cursor))?;
    match outcome {
        ApplyOutcome::AlreadyProcessed => {
            debug!("entry {} from {} already processed", raw.entry_id, raw.source)
        }
        ApplyOutcome::FailedEntry => {
            debug!("entry {} from {} failed on the ledger", raw.entry_id, raw.source)
        }
        ApplyOutcome::Applied(counts) => debug!(
            "entry {} from {} applied {} pixels, {} shards",
            raw.entry_id, raw.source, counts.pixels, counts.shards
        ),
    }
    Ok(EntryOutcome::Applied(outcome))
}
