use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{
    encode_frame, encode_pixel_colors, encode_sysex, encode_sysex_command, Command, Frame,
    MAX_PAYLOAD,
};
use crate::error::{FrameError, Result};
use crate::pixels::PixelData;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Configuration for the frame writer.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Maximum payload size in bytes. Default and ceiling: 65535.
    pub max_payload_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD,
        }
    }
}

/// Writes complete frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: WriterConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, WriterConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: WriterConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write a complete frame (blocking).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.channel, frame.command, frame.payload.as_ref())
    }

    /// Encode and send a payload on a channel.
    pub fn send(
        &mut self,
        channel: u8,
        command: impl Into<Command>,
        payload: &[u8],
    ) -> Result<()> {
        self.check_size(payload.len())?;
        self.buf.clear();
        encode_frame(channel, command, payload, &mut self.buf)?;
        self.write_buffered()
    }

    /// Send a `SetPixelColors` frame from either pixel representation.
    pub fn set_pixel_colors(&mut self, channel: u8, pixels: &PixelData) -> Result<()> {
        self.check_size(pixels.byte_len())?;
        self.buf.clear();
        encode_pixel_colors(channel, pixels, &mut self.buf)?;
        self.write_buffered()
    }

    /// Send a `SysEx` frame: `system_id` followed by `data`.
    pub fn sysex(&mut self, channel: u8, system_id: u16, data: &[u8]) -> Result<()> {
        self.check_size(2 + data.len())?;
        self.buf.clear();
        encode_sysex(channel, system_id, data, &mut self.buf)?;
        self.write_buffered()
    }

    /// Send a `SysEx` frame with an explicit sysex command id.
    pub fn sysex_command(
        &mut self,
        channel: u8,
        system_id: u16,
        command_id: u16,
        data: &[u8],
    ) -> Result<()> {
        self.check_size(4 + data.len())?;
        self.buf.clear();
        encode_sysex_command(channel, system_id, command_id, data, &mut self.buf)?;
        self.write_buffered()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame encoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size,
                max: self.config.max_payload_size,
            });
        }
        Ok(())
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }
}
