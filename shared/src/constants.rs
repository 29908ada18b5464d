// Canvas geometry

/// Canvas resolution per dimension (2^19 = 524,288)
pub const CANVAS_RES: u32 = 524_288;

/// Each shard is a square of SHARD_DIMENSION x SHARD_DIMENSION pixels
pub const SHARD_DIMENSION: u32 = 90;

/// Number of shards per dimension (ceiling division: 524,288 / 90 = 5,826)
pub const SHARDS_PER_DIM: u32 = (CANVAS_RES + SHARD_DIMENSION - 1) / SHARD_DIMENSION;

/// Pixels stored in each shard (90 * 90 = 8,100)
pub const PIXELS_PER_SHARD: usize = (SHARD_DIMENSION * SHARD_DIMENSION) as usize;

/// Bytes needed to store a shard's pixels.
/// The 8-bit encoding is used: one byte per pixel, no packing.
pub const BYTES_PER_SHARD: usize = PIXELS_PER_SHARD;

// Colors

/// Color index meaning "unset / transparent". Only produced by an erase.
pub const COLOR_UNSET: u8 = 0;

/// Highest palette index a pixel may be painted with (8-bit storage, 1-255)
pub const MAX_COLOR: u8 = 255;

// Ledger addressing

/// Seed prefix for shard program-derived addresses
pub const SHARD_SEED: &[u8] = b"shard";

/// Marker appended when hashing a program-derived address
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Production id of the canvas program on the ledger
pub const DEFAULT_PROGRAM_ID: [u8; 32] = [
    0x37, 0x56, 0xbe, 0xe7, 0xbb, 0xf1, 0xb2, 0x5d, 0x9c, 0xa4, 0x61, 0xa5, 0x5d, 0x45, 0x6d, 0xfe,
    0x3c, 0x8c, 0xda, 0x8b, 0x68, 0x42, 0x10, 0x09, 0x8b, 0x3b, 0x88, 0xb8, 0x99, 0x45, 0x79, 0x73,
];

/// Id of the delegation program. A shard account owned by it is bound to the
/// ephemeral overlay.
pub const DELEGATION_PROGRAM_ID: [u8; 32] = [
    0xb5, 0xb7, 0x00, 0xe1, 0xf2, 0x57, 0x3a, 0xc0, 0xcc, 0x06, 0x22, 0x01, 0x34, 0x4a, 0xcf, 0x97,
    0xb8, 0x35, 0x06, 0xeb, 0x8c, 0xe5, 0x19, 0x98, 0xcc, 0x62, 0x7e, 0x18, 0x93, 0x80, 0xa7, 0x3e,
];

// Feeds

/// Upper bound on the size of each recency feed served by the read api
pub const FEED_LIMIT: usize = 15;
