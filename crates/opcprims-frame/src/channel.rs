//! Channel addressing.
//!
//! Channel 0 is broadcast: every receiver accepts it regardless of the
//! channel it is configured for. Channels 1-255 address a single receiver.

/// Broadcast channel, accepted by every receiver.
pub const BROADCAST: u8 = 0;

/// Returns true if a receiver configured for `configured` accepts a frame
/// addressed to `channel`.
pub fn accepts(configured: u8, channel: u8) -> bool {
    channel == BROADCAST || channel == configured
}

/// Returns true if the channel is the broadcast channel.
pub fn is_broadcast(channel: u8) -> bool {
    channel == BROADCAST
}
