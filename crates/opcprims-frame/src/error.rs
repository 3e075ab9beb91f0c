/// Errors that can occur during frame encoding/decoding.
///
/// Protocol-level malformation (wrong channel, unmatched system id, short
/// SysEx payload, unknown command) is never reported here: such frames are
/// dropped by the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit the 16-bit length field (or a configured limit).
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Input handed in at the transport boundary is not a valid byte sequence.
    #[error("invalid input encoding: {reason}")]
    InvalidInputEncoding { reason: String },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
