use pixelplace_shared::{ColorIndex, Timestamp};

use crate::replica::pending_write::PendingWrite;

/// Replica state of one pixel. A pixel with no entry is unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelState {
    /// Authoritative value from a snapshot or a live event
    Known {
        color: ColorIndex,
        timestamp: Timestamp,
    },
    /// A local write is in flight. `base` is the authoritative value it
    /// shadows, `None` if the pixel was unknown.
    Pending {
        color: ColorIndex,
        write: PendingWrite,
        base: Option<(ColorIndex, Timestamp)>,
    },
    /// A local write failed and the prior value was restored
    RolledBack {
        color: ColorIndex,
        timestamp: Timestamp,
    },
}

impl PixelState {
    /// The color to display
    pub fn color(&self) -> ColorIndex {
        match self {
            PixelState::Known { color, .. }
            | PixelState::Pending { color, .. }
            | PixelState::RolledBack { color, .. } => *color,
        }
    }

    /// The authoritative value under any pending write
    pub fn authoritative(&self) -> Option<(ColorIndex, Timestamp)> {
        match self {
            PixelState::Known { color, timestamp } | PixelState::RolledBack { color, timestamp } => {
                Some((*color, *timestamp))
            }
            PixelState::Pending { base, .. } => *base,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, PixelState::Pending { .. })
    }
}
