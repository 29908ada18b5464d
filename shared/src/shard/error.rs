use thiserror::Error;

/// Errors that can occur while decoding or editing a shard's pixel array
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShardPixelsError {
    /// A shard blob did not have exactly one byte per pixel
    #[error("Shard pixel blob has {actual} bytes, expected {expected} (8-bit encoding)")]
    InvalidLength { expected: usize, actual: usize },

    /// A local offset fell outside the shard
    #[error("Local offset ({x}, {y}) is outside a {dimension}x{dimension} shard")]
    OffsetOutOfRange { x: u32, y: u32, dimension: u32 },
}

/// Errors that can occur while deriving a shard's ledger address
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShardAddressError {
    /// Shard coordinate rejected before derivation
    #[error(transparent)]
    InvalidCoordinate(#[from] crate::geometry::error::CoordinateError),

    /// Every bump seed produced an on-curve point
    #[error("No off-curve address found for shard ({shard_x}, {shard_y}) after trying all bump seeds")]
    BumpSeedExhausted { shard_x: u16, shard_y: u16 },
}
