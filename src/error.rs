//! Error types for the tagstream codec.

/// Errors that can occur while packing or unpacking a value stream.
///
/// Every failure is fatal to the call that raised it: `pack` never returns a
/// partial buffer and `unpack` never returns a partial value sequence.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Pack-time: a value outside the encodable model.
    #[error("unsupported value: {0}")]
    Unsupported(String),

    /// Pack-time: table nesting exceeded the maximum depth of 32 levels.
    #[error("table nesting exceeds maximum depth")]
    DepthExceeded,

    /// Unpack-time: the stream ended before a value was complete.
    #[error("truncated stream: need {needed} bytes but only {remaining} remain")]
    Truncated { needed: usize, remaining: usize },

    /// Unpack-time: a tag byte with an unrecognized type.
    #[error("invalid tag byte 0x{0:02X}")]
    InvalidTag(u8),

    /// Unpack-time: a cookie that is not a valid width or length selector.
    #[error("invalid length cookie {0}")]
    InvalidLength(u8),
}
