use thiserror::Error;

/// Errors raised while turning raw ledger log lines into domain events.
///
/// Any of these marks the whole entry as malformed: it is logged and skipped
/// by the ingestor, and never aborts the batch it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The `Program data:` payload was not valid base64
    #[error("Log line {line} of entry {entry_id} is not valid base64")]
    InvalidBase64 { entry_id: String, line: usize },

    /// A known event's payload ended before all fields were read
    #[error("{event} payload in entry {entry_id} is truncated: needed {needed} more bytes at offset {offset}")]
    Truncated {
        entry_id: String,
        event: &'static str,
        offset: usize,
        needed: usize,
    },

    /// A decoded field is outside the range the program can emit
    #[error("{event} in entry {entry_id} has invalid field {field}: {reason}")]
    InvalidField {
        entry_id: String,
        event: &'static str,
        field: &'static str,
        reason: String,
    },
}

/// Internal error of [`super::ByteReader`]; mapped into
/// [`DecodeError::Truncated`] by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Needed {needed} bytes at offset {offset}")]
pub struct ShortRead {
    pub offset: usize,
    pub needed: usize,
}
