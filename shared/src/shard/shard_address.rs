//! # Shard addressing
//! Every shard's state lives in one ledger account whose address is derived
//! from the shard coordinate and the canvas program id. Client and server use
//! this derivation to agree on where a shard lives without asking the ledger.

use curve25519_dalek::edwards::CompressedEdwardsY;
use sha2::{Digest, Sha256};

use crate::{
    constants::{PDA_MARKER, SHARD_SEED},
    shard::error::ShardAddressError,
    Pubkey, ShardKey,
};

/// The canonical ledger address of a shard together with the bump seed that
/// pushed it off the ed25519 curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShardAddress {
    pub address: Pubkey,
    pub bump: u8,
}

/// Derives the program address of a shard account.
///
/// Seeds are `["shard", shard_x LE, shard_y LE]`; bumps are tried from 255
/// downwards and the first candidate that is not a curve point is returned.
pub fn shard_address(key: &ShardKey, program_id: &Pubkey) -> Result<ShardAddress, ShardAddressError> {
    let x_seed = key.shard_x().to_le_bytes();
    let y_seed = key.shard_y().to_le_bytes();
    let seeds: [&[u8]; 3] = [SHARD_SEED, &x_seed, &y_seed];

    for bump in (0..=u8::MAX).rev() {
        if let Some(address) = create_program_address(&seeds, bump, program_id) {
            return Ok(ShardAddress { address, bump });
        }
    }

    Err(ShardAddressError::BumpSeedExhausted {
        shard_x: key.shard_x(),
        shard_y: key.shard_y(),
    })
}

/// Validates a raw shard coordinate, then derives its address.
pub fn try_shard_address(
    shard_x: u32,
    shard_y: u32,
    program_id: &Pubkey,
) -> Result<ShardAddress, ShardAddressError> {
    let key = ShardKey::new(shard_x, shard_y)?;
    shard_address(&key, program_id)
}

fn create_program_address(seeds: &[&[u8]], bump: u8, program_id: &Pubkey) -> Option<Pubkey> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);
    let candidate: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&candidate) {
        return None;
    }
    Some(Pubkey::new(candidate))
}

fn is_on_curve(bytes: &[u8; 32]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}
