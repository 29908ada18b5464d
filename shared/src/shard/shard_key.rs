use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    constants::{CANVAS_RES, SHARDS_PER_DIM, SHARD_DIMENSION},
    geometry::error::CoordinateError,
    GlobalPixel,
};

/// Identifies one shard of the canvas: `(floor(px / D), floor(py / D))`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShardKey {
    shard_x: u16,
    shard_y: u16,
}

/// Pixel rectangle covered by a shard, half-open on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    pub min_px: u32,
    pub min_py: u32,
    pub max_px: u32,
    pub max_py: u32,
}

impl PixelBounds {
    pub fn contains(&self, pixel: &GlobalPixel) -> bool {
        (self.min_px..self.max_px).contains(&pixel.px())
            && (self.min_py..self.max_py).contains(&pixel.py())
    }
}

impl ShardKey {
    /// Validates a shard coordinate against the shard grid
    pub fn new(shard_x: u32, shard_y: u32) -> Result<Self, CoordinateError> {
        if shard_x >= SHARDS_PER_DIM || shard_y >= SHARDS_PER_DIM {
            return Err(CoordinateError::ShardOutOfRange {
                shard_x,
                shard_y,
                limit: SHARDS_PER_DIM,
            });
        }
        Ok(Self {
            shard_x: shard_x as u16,
            shard_y: shard_y as u16,
        })
    }

    /// The shard containing an already-validated pixel
    pub fn containing(pixel: &GlobalPixel) -> Self {
        // SHARDS_PER_DIM < u16::MAX, so a valid pixel always yields a valid key
        Self {
            shard_x: (pixel.px() / SHARD_DIMENSION) as u16,
            shard_y: (pixel.py() / SHARD_DIMENSION) as u16,
        }
    }

    pub fn shard_x(&self) -> u16 {
        self.shard_x
    }

    pub fn shard_y(&self) -> u16 {
        self.shard_y
    }

    /// Pixel rectangle this shard covers. Edge shards are truncated at the
    /// canvas border.
    pub fn pixel_bounds(&self) -> PixelBounds {
        let min_px = self.shard_x as u32 * SHARD_DIMENSION;
        let min_py = self.shard_y as u32 * SHARD_DIMENSION;
        PixelBounds {
            min_px,
            min_py,
            max_px: (min_px + SHARD_DIMENSION).min(CANVAS_RES),
            max_py: (min_py + SHARD_DIMENSION).min(CANVAS_RES),
        }
    }

    /// Returns an error when `pixel` is not inside this shard.
    pub fn check_contains(&self, pixel: &GlobalPixel) -> Result<(), CoordinateError> {
        if ShardKey::containing(pixel) != *self {
            return Err(CoordinateError::ShardMismatch {
                px: pixel.px(),
                py: pixel.py(),
                shard_x: self.shard_x,
                shard_y: self.shard_y,
            });
        }
        Ok(())
    }
}

/// Maps a raw pixel coordinate to its shard, rejecting coordinates outside the
/// canvas.
pub fn shard_for_pixel(px: u32, py: u32) -> Result<ShardKey, CoordinateError> {
    let pixel = GlobalPixel::new(px, py)?;
    Ok(ShardKey::containing(&pixel))
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shard({}, {})", self.shard_x, self.shard_y)
    }
}
