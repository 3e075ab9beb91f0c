//! Channel filtering and command-specific parsing of decoded frames.
//!
//! Frames that are not addressed to this receiver, carry an unknown command,
//! or hold a malformed or foreign SysEx sub-message are dropped without an
//! error. Listeners sharing a channel are expected to ignore what is not
//! meant for them.

use bytes::{Buf, Bytes};
use tracing::debug;

use crate::channel;
use crate::codec::{Command, Frame, DEFAULT_SYSTEM_ID, SYSEX_HEADER_SIZE};
use crate::decoder::FrameDecoder;
use crate::pixels::{DataFormat, PixelData, BYTES_PER_PIXEL};

/// Receiver-side configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverConfig {
    /// Channel this receiver listens on. Broadcast frames are always accepted.
    pub channel: u8,
    /// SysEx messages for any other system id are dropped.
    pub system_id: u16,
    /// Representation handed out for pixel payloads.
    pub data_format: DataFormat,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            channel: channel::BROADCAST,
            system_id: DEFAULT_SYSTEM_ID,
            data_format: DataFormat::Buffer,
        }
    }
}

impl ReceiverConfig {
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_system_id(mut self, system_id: u16) -> Self {
        self.system_id = system_id;
        self
    }

    pub fn with_data_format(mut self, data_format: DataFormat) -> Self {
        self.data_format = data_format;
        self
    }
}

/// A parsed SysEx sub-message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysEx {
    pub system_id: u16,
    pub command_id: u16,
    pub data: Bytes,
}

impl SysEx {
    /// Parse `system_id | command_id | data`. Returns `None` when the payload
    /// is shorter than the 4-byte sub-header.
    pub fn parse(payload: &Bytes) -> Option<Self> {
        if payload.len() < SYSEX_HEADER_SIZE {
            return None;
        }
        let mut header = &payload[..SYSEX_HEADER_SIZE];
        let system_id = header.get_u16();
        let command_id = header.get_u16();
        Some(Self {
            system_id,
            command_id,
            data: payload.slice(SYSEX_HEADER_SIZE..),
        })
    }
}

/// A frame that passed filtering, ready for the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    SetPixelColors { channel: u8, pixels: PixelData },
    SysEx { channel: u8, sysex: SysEx },
}

impl Message {
    /// Channel the originating frame was addressed to.
    pub fn channel(&self) -> u8 {
        match self {
            Message::SetPixelColors { channel, .. } | Message::SysEx { channel, .. } => *channel,
        }
    }
}

/// Applies channel filtering and sub-protocol parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher {
    config: ReceiverConfig,
}

impl Dispatcher {
    pub fn new(config: ReceiverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Turn a frame into a message, or `None` if it is dropped.
    pub fn dispatch(&self, frame: &Frame) -> Option<Message> {
        if !channel::accepts(self.config.channel, frame.channel) {
            debug!(
                channel = frame.channel,
                listening = self.config.channel,
                "dropping frame for another channel"
            );
            return None;
        }

        match frame.command {
            Command::SetPixelColors => Some(self.pixel_colors(frame)),
            Command::SysEx => self.sysex(frame),
            Command::Other(command) => {
                debug!(command, "dropping frame with unknown command");
                None
            }
        }
    }

    fn pixel_colors(&self, frame: &Frame) -> Message {
        if frame.payload.len() % BYTES_PER_PIXEL != 0 {
            debug!(
                len = frame.payload.len(),
                "pixel payload is not a whole number of pixels"
            );
        }
        let pixels =
            PixelData::Buffer(frame.payload.clone()).into_format(self.config.data_format);
        Message::SetPixelColors {
            channel: frame.channel,
            pixels,
        }
    }

    fn sysex(&self, frame: &Frame) -> Option<Message> {
        let Some(sysex) = SysEx::parse(&frame.payload) else {
            debug!(len = frame.payload.len(), "dropping short sysex payload");
            return None;
        };
        if sysex.system_id != self.config.system_id {
            debug!(
                system_id = sysex.system_id,
                expected = self.config.system_id,
                "dropping sysex for another system"
            );
            return None;
        }
        Some(Message::SysEx {
            channel: frame.channel,
            sysex,
        })
    }
}

/// Incremental decoder followed by the dispatcher: bytes in, messages out.
#[derive(Debug, Default)]
pub struct MessageDecoder {
    frames: FrameDecoder,
    dispatcher: Dispatcher,
}

impl MessageDecoder {
    pub fn new(config: ReceiverConfig) -> Self {
        Self {
            frames: FrameDecoder::new(),
            dispatcher: Dispatcher::new(config),
        }
    }

    /// Feed one chunk and collect the messages it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Message> {
        let mut messages = Vec::new();
        self.feed_with(chunk, |message| messages.push(message));
        messages
    }

    /// Feed one chunk and hand each accepted message to `on_message`, in
    /// frame order, before returning.
    pub fn feed_with<F>(&mut self, chunk: &[u8], mut on_message: F)
    where
        F: FnMut(Message),
    {
        let dispatcher = &self.dispatcher;
        self.frames.feed_with(chunk, |frame| {
            if let Some(message) = dispatcher.dispatch(&frame) {
                on_message(message);
            }
        });
    }

    /// Residual bytes held by the underlying frame decoder.
    pub fn buffered(&self) -> usize {
        self.frames.buffered()
    }

    pub fn config(&self) -> &ReceiverConfig {
        self.dispatcher.config()
    }
}
