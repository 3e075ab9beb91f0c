//! Open Pixel Control codec for addressable-pixel devices.
//!
//! opcprims encodes and decodes the OPC wire format: a 4-byte header
//! (channel, command, big-endian length) followed by either packed RGB pixel
//! data or a system-exclusive sub-message.
//!
//! # Crate Structure
//!
//! - [`frame`]: pixel codec, frame encoder, incremental decoder and dispatcher
//!
//! Transports are left to the caller: anything implementing `std::io::Read`
//! / `Write` works with [`frame::FrameReader`] / [`frame::FrameWriter`], and
//! the `async` feature adds `tokio_util::codec` adapters.

/// Re-export frame types.
pub mod frame {
    pub use opcprims_frame::*;
}
