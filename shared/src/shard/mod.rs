pub mod error;
pub mod shard_address;
pub mod shard_key;
pub mod shard_pixels;
