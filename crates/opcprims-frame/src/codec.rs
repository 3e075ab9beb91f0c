use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::pixels::{self, PixelData};

/// Frame header: channel (1) + command (1) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// SysEx sub-header: system id (2) + sysex command id (2) = 4 bytes.
pub const SYSEX_HEADER_SIZE: usize = 4;

/// System id receivers listen for unless configured otherwise.
pub const DEFAULT_SYSTEM_ID: u16 = 0xFFFF;

/// System id registered for Fadecandy controllers.
pub const FADECANDY_SYSTEM_ID: u16 = 0x0001;

/// Frame command byte.
///
/// Values other than `SetPixelColors` and `SysEx` are reserved and carried
/// through as `Other` so frames round-trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    SetPixelColors,
    SysEx,
    Other(u8),
}

impl Command {
    pub const SET_PIXEL_COLORS: u8 = 0x00;
    pub const SYSEX: u8 = 0xFF;

    /// The wire byte for this command.
    pub fn as_u8(self) -> u8 {
        match self {
            Command::SetPixelColors => Self::SET_PIXEL_COLORS,
            Command::SysEx => Self::SYSEX,
            Command::Other(value) => value,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Command::SetPixelColors => "SET_PIXEL_COLORS",
            Command::SysEx => "SYSEX",
            Command::Other(_) => "RESERVED",
        }
    }
}

impl From<u8> for Command {
    fn from(value: u8) -> Self {
        match value {
            Self::SET_PIXEL_COLORS => Command::SetPixelColors,
            Self::SYSEX => Command::SysEx,
            other => Command::Other(other),
        }
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command.as_u8()
    }
}

/// One complete wire frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Target channel, 0 for broadcast.
    pub channel: u8,
    pub command: Command,
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(channel: u8, command: impl Into<Command>, payload: impl Into<Bytes>) -> Self {
        Self {
            channel,
            command: command.into(),
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────┬───────────┬──────────────┬──────────────────┐
/// │ Channel   │ Command   │ Length       │ Payload          │
/// │ (1B)      │ (1B)      │ (2B BE)      │ (Length bytes)   │
/// └───────────┴───────────┴──────────────┴──────────────────┘
/// ```
pub fn encode_frame(
    channel: u8,
    command: impl Into<Command>,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    let length = checked_length(payload.len())?;
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u8(channel);
    dst.put_u8(command.into().as_u8());
    dst.put_u16(length);
    dst.put_slice(payload);
    Ok(())
}

/// Encode a single frame into a freshly allocated buffer of exactly
/// `4 + payload.len()` bytes.
pub fn encode(channel: u8, command: impl Into<Command>, payload: &[u8]) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    encode_frame(channel, command, payload, &mut dst)?;
    Ok(dst.freeze())
}

/// Encode a `SetPixelColors` frame from either pixel representation.
pub fn encode_pixel_colors(channel: u8, pixels: &PixelData, dst: &mut BytesMut) -> Result<()> {
    match pixels {
        PixelData::Buffer(buf) => encode_frame(channel, Command::SetPixelColors, buf, dst),
        PixelData::IntArray(ints) => {
            let buf = pixels::to_buffer(ints);
            encode_frame(channel, Command::SetPixelColors, &buf, dst)
        }
    }
}

/// Encode a `SysEx` frame whose payload is `system_id` (BE) followed by `data`.
///
/// `data` is expected to start with the 2-byte sysex command id.
pub fn encode_sysex(channel: u8, system_id: u16, data: &[u8], dst: &mut BytesMut) -> Result<()> {
    let length = checked_length(2 + data.len())?;
    dst.reserve(HEADER_SIZE + length as usize);
    dst.put_u8(channel);
    dst.put_u8(Command::SYSEX);
    dst.put_u16(length);
    dst.put_u16(system_id);
    dst.put_slice(data);
    Ok(())
}

/// Encode a `SysEx` frame with the full sub-header:
/// `system_id | command_id | data`.
pub fn encode_sysex_command(
    channel: u8,
    system_id: u16,
    command_id: u16,
    data: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    let length = checked_length(SYSEX_HEADER_SIZE + data.len())?;
    dst.reserve(HEADER_SIZE + length as usize);
    dst.put_u8(channel);
    dst.put_u8(Command::SYSEX);
    dst.put_u16(length);
    dst.put_u16(system_id);
    dst.put_u16(command_id);
    dst.put_slice(data);
    Ok(())
}

fn checked_length(size: usize) -> Result<u16> {
    u16::try_from(size).map_err(|_| FrameError::PayloadTooLarge {
        size,
        max: MAX_PAYLOAD,
    })
}

/// Decode one frame from the front of a buffer.
///
/// Returns `None` if the buffer doesn't hold a complete frame yet, leaving it
/// untouched (a partial header is kept so it can be re-read later).
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut) -> Option<Frame> {
    if src.len() < HEADER_SIZE {
        return None; // Need more data
    }

    let channel = src[0];
    let command = Command::from(src[1]);
    let payload_len = usize::from(u16::from_be_bytes([src[2], src[3]]));

    if src.len() < HEADER_SIZE + payload_len {
        return None; // Need more data
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Some(Frame {
        channel,
        command,
        payload,
    })
}
