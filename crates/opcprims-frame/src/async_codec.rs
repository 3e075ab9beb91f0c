//! `tokio_util::codec` adapters for `FramedRead` / `FramedWrite`.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame, encode_pixel_colors, encode_sysex_command, Frame};
use crate::dispatch::{Dispatcher, Message, ReceiverConfig};
use crate::error::FrameError;
use crate::pixels::PixelData;

/// Frame-level codec: every complete frame, no filtering.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpcCodec;

impl Decoder for OpcCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        Ok(decode_frame(src))
    }
}

impl Encoder<Frame> for OpcCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_frame(frame.channel, frame.command, &frame.payload, dst)
    }
}

/// Message-level codec: decodes only frames that pass the dispatcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCodec {
    dispatcher: Dispatcher,
}

impl MessageCodec {
    pub fn new(config: ReceiverConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(config),
        }
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, FrameError> {
        while let Some(frame) = decode_frame(src) {
            if let Some(message) = self.dispatcher.dispatch(&frame) {
                return Ok(Some(message));
            }
        }
        Ok(None)
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = FrameError;

    fn encode(&mut self, message: Message, dst: &mut BytesMut) -> Result<(), FrameError> {
        match message {
            Message::SetPixelColors { channel, pixels } => {
                encode_pixel_colors(channel, &pixels, dst)
            }
            Message::SysEx { channel, sysex } => encode_sysex_command(
                channel,
                sysex.system_id,
                sysex.command_id,
                &sysex.data,
                dst,
            ),
        }
    }
}

impl Encoder<(u8, PixelData)> for MessageCodec {
    type Error = FrameError;

    fn encode(&mut self, item: (u8, PixelData), dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_pixel_colors(item.0, &item.1, dst)
    }
}
