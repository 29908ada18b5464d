use crate::events::{
    decoder::{pixel_changed_discriminator, shard_initialized_discriminator, PROGRAM_DATA_PREFIX},
    domain_event::DomainEvent,
};

/// Encodes an event payload exactly as the canvas program emits it.
pub fn encode_event(event: &DomainEvent) -> Vec<u8> {
    let mut output = Vec::with_capacity(96);
    match event {
        DomainEvent::PixelChanged(pixel) => {
            output.extend_from_slice(&pixel_changed_discriminator());
            output.extend_from_slice(&pixel.pixel.px().to_le_bytes());
            output.extend_from_slice(&pixel.pixel.py().to_le_bytes());
            output.push(pixel.color);
            output.extend_from_slice(pixel.painter.as_bytes());
            output.extend_from_slice(pixel.actor.as_bytes());
            output.extend_from_slice(&pixel.timestamp.to_le_bytes());
        }
        DomainEvent::ShardInitialized(shard) => {
            output.extend_from_slice(&shard_initialized_discriminator());
            output.extend_from_slice(&shard.shard.shard_x().to_le_bytes());
            output.extend_from_slice(&shard.shard.shard_y().to_le_bytes());
            output.extend_from_slice(shard.creator.as_bytes());
            output.extend_from_slice(shard.actor.as_bytes());
            output.extend_from_slice(&shard.timestamp.to_le_bytes());
        }
    }
    output
}

/// Encodes an event as the `Program data:` log line carrying it.
pub fn encode_log_line(event: &DomainEvent) -> String {
    format!("{}{}", PROGRAM_DATA_PREFIX, base64::encode(encode_event(event)))
}
