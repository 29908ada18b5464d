
pub use entry_builder::{failed_entry, garbled_entry, raw_entry, truncated_entry};
pub use event_builder::{log_lines, PixelEventBuilder, ShardEventBuilder, ACTOR, PAINTER};
