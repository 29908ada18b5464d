use crate::{
    constants::{BYTES_PER_SHARD, COLOR_UNSET, SHARD_DIMENSION},
    geometry::global_pixel::LocalOffset,
    shard::error::ShardPixelsError,
    ColorIndex, GlobalPixel, ShardKey,
};

/// The pixel array of one shard in the 8-bit encoding: one byte per pixel,
/// row-major, `0` meaning unset.
#[derive(Clone, PartialEq, Eq)]
pub struct ShardPixels {
    bytes: Vec<u8>,
}

impl ShardPixels {
    /// A shard with every pixel unset
    pub fn new() -> Self {
        Self {
            bytes: vec![COLOR_UNSET; BYTES_PER_SHARD],
        }
    }

    /// Wraps a raw account blob, rejecting any length other than one byte per
    /// pixel.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ShardPixelsError> {
        if bytes.len() != BYTES_PER_SHARD {
            return Err(ShardPixelsError::InvalidLength {
                expected: BYTES_PER_SHARD,
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn get(&self, offset: &LocalOffset) -> Result<ColorIndex, ShardPixelsError> {
        let index = Self::checked_index(offset)?;
        Ok(self.bytes[index])
    }

    /// Writes a color and returns the one it replaced.
    pub fn set(
        &mut self,
        offset: &LocalOffset,
        color: ColorIndex,
    ) -> Result<ColorIndex, ShardPixelsError> {
        let index = Self::checked_index(offset)?;
        let previous = self.bytes[index];
        self.bytes[index] = color;
        Ok(previous)
    }

    /// Number of pixels holding a palette color
    pub fn painted_count(&self) -> usize {
        self.bytes.iter().filter(|color| **color != COLOR_UNSET).count()
    }

    /// Every pixel of the shard in global coordinates with its stored color,
    /// unset ones included. Offsets beyond the canvas edge are skipped.
    pub fn pixels(&self, key: &ShardKey) -> Vec<(GlobalPixel, ColorIndex)> {
        let bounds = key.pixel_bounds();
        let mut output = Vec::with_capacity(self.bytes.len());
        for (index, color) in self.bytes.iter().enumerate() {
            let x = index as u32 % SHARD_DIMENSION;
            let y = index as u32 / SHARD_DIMENSION;
            if let Ok(pixel) = GlobalPixel::new(bounds.min_px + x, bounds.min_py + y) {
                output.push((pixel, *color));
            }
        }
        output
    }

    /// Every painted pixel of the shard in global coordinates
    pub fn painted_pixels(&self, key: &ShardKey) -> Vec<(GlobalPixel, ColorIndex)> {
        let mut output = self.pixels(key);
        output.retain(|(_, color)| *color != COLOR_UNSET);
        output
    }

    fn checked_index(offset: &LocalOffset) -> Result<usize, ShardPixelsError> {
        if offset.x >= SHARD_DIMENSION || offset.y >= SHARD_DIMENSION {
            return Err(ShardPixelsError::OffsetOutOfRange {
                x: offset.x,
                y: offset.y,
                dimension: SHARD_DIMENSION,
            });
        }
        Ok(offset.index())
    }
}

impl Default for ShardPixels {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShardPixels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ShardPixels {{ painted: {} }}", self.painted_count())
    }
}
