use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 32-byte ledger account key. Rendered as lowercase hex; parsed from
/// either hex or the ledger's base58 form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Pubkey([u8; 32]);

/// Errors that can occur while parsing a key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PubkeyParseError {
    /// The text decoded to the wrong number of bytes
    #[error("Key decodes to {length} bytes, expected 32")]
    InvalidLength { length: usize },

    #[error("Key contains a non-hex character at position {position}")]
    InvalidCharacter { position: usize },

    #[error("Key is neither 64 hex characters nor base58: {message}")]
    InvalidBase58 { message: String },
}

impl Pubkey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The form wallets and explorers display
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

const HEX_LEN: usize = 64;

impl FromStr for Pubkey {
    type Err = PubkeyParseError;

    /// 64 characters are read as hex, anything else as base58. A 32-byte key
    /// is at most 44 base58 characters, so the two never overlap.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        if s.len() == HEX_LEN {
            hex::decode_to_slice(s, &mut bytes).map_err(|err| match err {
                hex::FromHexError::InvalidHexCharacter { index, .. } => {
                    PubkeyParseError::InvalidCharacter { position: index }
                }
                _ => PubkeyParseError::InvalidLength { length: s.len() / 2 },
            })?;
            return Ok(Self(bytes));
        }

        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|err| PubkeyParseError::InvalidBase58 {
                message: err.to_string(),
            })?;
        let bytes: [u8; 32] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| PubkeyParseError::InvalidLength {
                length: decoded.len(),
            })?;
        Ok(Self(bytes))
    }
}

impl From<Pubkey> for String {
    fn from(key: Pubkey) -> Self {
        key.to_hex()
    }
}

impl TryFrom<String> for Pubkey {
    type Error = PubkeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self.to_hex())
    }
}
