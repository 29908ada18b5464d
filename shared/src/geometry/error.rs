use thiserror::Error;

/// Errors raised when a coordinate falls outside the canvas or the projection.
///
/// Mapping functions fail fast with one of these before any network call is
/// made; they never clamp.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude is not finite or lies beyond the Mercator latitude bound
    #[error("Latitude {lat} is outside the projectable range +/-{bound}")]
    LatitudeOutOfRange { lat: f64, bound: f64 },

    /// Longitude is not finite or lies outside [-180, 180)
    #[error("Longitude {lon} is outside [-180, 180)")]
    LongitudeOutOfRange { lon: f64 },

    /// Pixel coordinate lies outside [0, CANVAS_RES)
    #[error("Pixel ({px}, {py}) is outside the canvas (0..{limit})")]
    PixelOutOfRange { px: u32, py: u32, limit: u32 },

    /// Shard coordinate lies outside [0, SHARDS_PER_DIM)
    #[error("Shard ({shard_x}, {shard_y}) is outside the shard grid (0..{limit})")]
    ShardOutOfRange {
        shard_x: u32,
        shard_y: u32,
        limit: u32,
    },

    /// A pixel was addressed through a shard that does not contain it
    #[error("Pixel ({px}, {py}) does not belong to shard ({shard_x}, {shard_y})")]
    ShardMismatch {
        px: u32,
        py: u32,
        shard_x: u16,
        shard_y: u16,
    },
}
