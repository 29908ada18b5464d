//! # Pixelplace Shared
//! Canvas geometry, shard addressing, ledger event decoding and the read api's
//! wire shapes, shared between pixelplace-server & pixelplace-client.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod constants;
mod events;
mod geometry;
mod ledger;
mod shard;
mod types;
pub mod wire;

pub use events::{
    decoder::{decode_entry, event_discriminator, PROGRAM_DATA_PREFIX},
    domain_event::{DomainEvent, PixelEvent, ShardEvent},
    encoder::{encode_event, encode_log_line},
    error::DecodeError,
};
pub use geometry::{
    coordinate_mapper::{to_lat_lon, to_pixel, try_to_lat_lon, LatLon, MAX_LATITUDE},
    error::CoordinateError,
    global_pixel::{GlobalPixel, LocalOffset},
};
pub use ledger::{
    error::LedgerError,
    pubkey::{Pubkey, PubkeyParseError},
    raw_log_batch::RawLogBatch,
};
pub use shard::{
    error::{ShardAddressError, ShardPixelsError},
    shard_address::{shard_address, try_shard_address, ShardAddress},
    shard_key::{shard_for_pixel, PixelBounds, ShardKey},
    shard_pixels::ShardPixels,
};
pub use types::{ColorIndex, EntryId, Slot, SourceLabel, Timestamp};
