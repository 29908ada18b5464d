use std::fmt;

use serde::{Deserialize, Serialize};

/// Palette index of a pixel. 0 = unset.
pub type ColorIndex = u8;

/// Ledger timestamp in unix seconds. 0 marks a snapshot value with no known
/// write time.
pub type Timestamp = u64;

/// Ledger slot, the ordering position of an entry within its source.
pub type Slot = u64;

/// Identifies which of the two ledger tiers an entry was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLabel {
    /// The durable base layer
    Base,
    /// The fast ephemeral overlay that commits back to the base layer
    Ephemeral,
}

impl SourceLabel {
    pub const ALL: [SourceLabel; 2] = [SourceLabel::Base, SourceLabel::Ephemeral];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLabel::Base => "base",
            SourceLabel::Ephemeral => "ephemeral",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "base" => Some(SourceLabel::Base),
            "ephemeral" => Some(SourceLabel::Ephemeral),
            _ => None,
        }
    }
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique id of a ledger entry (transaction signature). Used for dedup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
