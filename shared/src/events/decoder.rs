//! # Log decoding
//! Turns the loosely-typed program log lines of a ledger entry into the closed
//! [`DomainEvent`] union.
//!
//! Events are emitted on `Program data: <base64>` lines. Each payload starts
//! with an 8-byte discriminator, `sha256("event:<Name>")[..8]`, followed by the
//! event's fields in little-endian order. Unknown discriminators belong to
//! other programs or newer event kinds and are skipped.

use std::sync::OnceLock;

use log::debug;
use sha2::{Digest, Sha256};

use crate::{
    constants::SHARDS_PER_DIM,
    events::{
        domain_event::{DomainEvent, PixelEvent, ShardEvent},
        error::{DecodeError, ShortRead},
        ByteReader,
    },
    EntryId, GlobalPixel, RawLogBatch, ShardKey,
};

/// Prefix of log lines carrying an event payload
pub const PROGRAM_DATA_PREFIX: &str = "Program data: ";

pub(crate) const PIXEL_CHANGED: &str = "PixelChanged";
pub(crate) const SHARD_INITIALIZED: &str = "ShardInitialized";

/// Computes the 8-byte discriminator of an event name.
pub fn event_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("event:{}", name).as_bytes());
    let mut output = [0u8; 8];
    output.copy_from_slice(&digest[..8]);
    output
}

pub(crate) fn pixel_changed_discriminator() -> [u8; 8] {
    static DISCRIMINATOR: OnceLock<[u8; 8]> = OnceLock::new();
    *DISCRIMINATOR.get_or_init(|| event_discriminator(PIXEL_CHANGED))
}

pub(crate) fn shard_initialized_discriminator() -> [u8; 8] {
    static DISCRIMINATOR: OnceLock<[u8; 8]> = OnceLock::new();
    *DISCRIMINATOR.get_or_init(|| event_discriminator(SHARD_INITIALIZED))
}

/// Decodes every domain event of an entry, in log order.
///
/// Failed entries decode to no events. If any known event is malformed the
/// whole entry is rejected, so a half-decoded entry is never applied.
pub fn decode_entry(batch: &RawLogBatch) -> Result<Vec<DomainEvent>, DecodeError> {
    if batch.failed {
        return Ok(Vec::new());
    }

    let mut events = Vec::new();
    for (line, log) in batch.logs.iter().enumerate() {
        let Some(encoded) = log.strip_prefix(PROGRAM_DATA_PREFIX) else {
            continue;
        };
        let payload = base64::decode(encoded.trim()).map_err(|_| DecodeError::InvalidBase64 {
            entry_id: batch.entry_id.to_string(),
            line,
        })?;
        if payload.len() < 8 {
            debug!(
                "Entry {}: skipping short program data on line {}",
                batch.entry_id, line
            );
            continue;
        }

        let event_index = events.len() as u16;
        let (discriminator, body) = payload.split_at(8);
        if discriminator == pixel_changed_discriminator() {
            events.push(decode_pixel_changed(body, &batch.entry_id, event_index)?);
        } else if discriminator == shard_initialized_discriminator() {
            events.push(decode_shard_initialized(body, &batch.entry_id, event_index)?);
        } else {
            debug!(
                "Entry {}: skipping unknown event discriminator on line {}",
                batch.entry_id, line
            );
        }
    }
    Ok(events)
}

fn truncated<'a>(
    entry_id: &'a EntryId,
    event: &'static str,
) -> impl Fn(ShortRead) -> DecodeError + 'a {
    move |short| DecodeError::Truncated {
        entry_id: entry_id.to_string(),
        event,
        offset: short.offset,
        needed: short.needed,
    }
}

fn decode_pixel_changed(
    body: &[u8],
    entry_id: &EntryId,
    event_index: u16,
) -> Result<DomainEvent, DecodeError> {
    let mut reader = ByteReader::new(body);
    let short = truncated(entry_id, PIXEL_CHANGED);

    let px = reader.read_u32().map_err(&short)?;
    let py = reader.read_u32().map_err(&short)?;
    let color = reader.read_u8().map_err(&short)?;
    let painter = reader.read_pubkey().map_err(&short)?;
    let actor = reader.read_pubkey().map_err(&short)?;
    let timestamp = reader.read_u64().map_err(&short)?;

    let pixel = GlobalPixel::new(px, py).map_err(|err| DecodeError::InvalidField {
        entry_id: entry_id.to_string(),
        event: PIXEL_CHANGED,
        field: "px/py",
        reason: err.to_string(),
    })?;

    Ok(DomainEvent::PixelChanged(PixelEvent {
        pixel,
        color,
        painter,
        actor,
        timestamp,
        entry_id: entry_id.clone(),
        event_index,
    }))
}

fn decode_shard_initialized(
    body: &[u8],
    entry_id: &EntryId,
    event_index: u16,
) -> Result<DomainEvent, DecodeError> {
    let mut reader = ByteReader::new(body);
    let short = truncated(entry_id, SHARD_INITIALIZED);

    let shard_x = reader.read_u16().map_err(&short)?;
    let shard_y = reader.read_u16().map_err(&short)?;
    let creator = reader.read_pubkey().map_err(&short)?;
    let actor = reader.read_pubkey().map_err(&short)?;
    let timestamp = reader.read_u64().map_err(&short)?;

    let shard = ShardKey::new(shard_x as u32, shard_y as u32).map_err(|_| {
        DecodeError::InvalidField {
            entry_id: entry_id.to_string(),
            event: SHARD_INITIALIZED,
            field: "shard_x/shard_y",
            reason: format!("({}, {}) is outside 0..{}", shard_x, shard_y, SHARDS_PER_DIM),
        }
    })?;

    Ok(DomainEvent::ShardInitialized(ShardEvent {
        shard,
        creator,
        actor,
        timestamp,
        entry_id: entry_id.clone(),
        event_index,
    }))
}
