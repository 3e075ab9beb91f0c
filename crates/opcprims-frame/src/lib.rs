//! Open Pixel Control framing for addressable-pixel devices.
//!
//! This is the core value-add layer of opcprims. Every message is framed with:
//! - A 1-byte channel (0 = broadcast)
//! - A 1-byte command (0x00 = set pixel colors, 0xFF = system exclusive)
//! - A 2-byte big-endian payload length
//!
//! Byte chunks may arrive split at any boundary; [`FrameDecoder`] reassembles
//! them and [`Dispatcher`] filters the result by channel and system id.

pub mod channel;
pub mod codec;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod hex;
pub mod pixels;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

pub use channel::BROADCAST;
pub use codec::{
    decode_frame, encode, encode_frame, encode_pixel_colors, encode_sysex, encode_sysex_command,
    Command, Frame, DEFAULT_SYSTEM_ID, FADECANDY_SYSTEM_ID, HEADER_SIZE, MAX_PAYLOAD,
};
pub use decoder::FrameDecoder;
pub use dispatch::{Dispatcher, Message, MessageDecoder, ReceiverConfig, SysEx};
pub use error::{FrameError, Result};
pub use pixels::{to_buffer, to_int_array, DataFormat, PixelData};
pub use reader::FrameReader;
pub use writer::{FrameWriter, WriterConfig};

#[cfg(feature = "async")]
pub use async_codec::{MessageCodec, OpcCodec};
