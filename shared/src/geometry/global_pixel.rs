use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    constants::{CANVAS_RES, SHARD_DIMENSION},
    geometry::error::CoordinateError,
    shard::shard_key::ShardKey,
};

/// A validated coordinate on the global canvas, (px, py) in [0, CANVAS_RES)^2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalPixel {
    px: u32,
    py: u32,
}

/// Position of a pixel inside its shard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocalOffset {
    pub x: u32,
    pub y: u32,
}

impl LocalOffset {
    /// Byte index into the shard's pixel array (`y * SHARD_DIMENSION + x`)
    pub fn index(&self) -> usize {
        (self.y * SHARD_DIMENSION + self.x) as usize
    }
}

impl GlobalPixel {
    pub fn new(px: u32, py: u32) -> Result<Self, CoordinateError> {
        if px >= CANVAS_RES || py >= CANVAS_RES {
            return Err(CoordinateError::PixelOutOfRange {
                px,
                py,
                limit: CANVAS_RES,
            });
        }
        Ok(Self { px, py })
    }

    pub fn px(&self) -> u32 {
        self.px
    }

    pub fn py(&self) -> u32 {
        self.py
    }

    /// The shard containing this pixel
    pub fn shard(&self) -> ShardKey {
        ShardKey::containing(self)
    }

    pub fn local_offset(&self) -> LocalOffset {
        LocalOffset {
            x: self.px % SHARD_DIMENSION,
            y: self.py % SHARD_DIMENSION,
        }
    }

    /// Packs the coordinate into one u64 key, used by hash maps on the client.
    pub fn to_u64(&self) -> u64 {
        ((self.px as u64) << 32) | self.py as u64
    }
}

impl fmt::Display for GlobalPixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.px, self.py)
    }
}
