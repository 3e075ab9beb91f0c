use std::fs::File;
use std::io::{self, Read};

use opcprims_frame::hex::decode_hex;
use opcprims_frame::{FrameDecoder, FrameError, MessageDecoder};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_frame, print_message, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            File::open(path)
                .map_err(|err| io_error(&format!("open {} failed", path.display()), err))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    let chunk_size = feed_chunk_size(args.chunk_size);
    let mut stream = if args.frames {
        DecodeStream::frames()
    } else {
        DecodeStream::messages(MessageDecoder::new(args.receiver.to_config()))
    };

    if args.hex {
        let bytes = read_hex(&mut input)?;
        for chunk in bytes.chunks(chunk_size) {
            stream.feed(chunk, format);
        }
    } else {
        let mut buf = vec![0u8; chunk_size];
        loop {
            let n = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(io_error("read failed", err)),
            };
            stream.feed(&buf[..n], format);
        }
    }

    let residual = stream.buffered();
    if residual > 0 {
        tracing::warn!(residual, "input ended inside a frame; trailing bytes ignored");
    }
    tracing::debug!(printed = stream.printed, "decode finished");

    Ok(SUCCESS)
}

const MAX_FEED_CHUNK: usize = 64 * 1024;

/// Bytes handed to the decoder per call, capped at `MAX_FEED_CHUNK` for raw
/// and hex input alike.
fn feed_chunk_size(requested: u64) -> usize {
    usize::try_from(requested)
        .unwrap_or(usize::MAX)
        .min(MAX_FEED_CHUNK)
}

/// Read the whole input as hex text.
fn read_hex(input: &mut dyn Read) -> CliResult<Vec<u8>> {
    let mut raw = Vec::new();
    input
        .read_to_end(&mut raw)
        .map_err(|err| io_error("read failed", err))?;

    let text = String::from_utf8(raw).map_err(|err| {
        frame_error(
            "decode failed",
            FrameError::InvalidInputEncoding {
                reason: format!("input is not UTF-8 text: {err}"),
            },
        )
    })?;

    decode_hex(&text).map_err(|err| frame_error("decode failed", err))
}

enum Target {
    Frames(FrameDecoder),
    Messages(MessageDecoder),
}

struct DecodeStream {
    target: Target,
    printed: usize,
}

impl DecodeStream {
    fn frames() -> Self {
        Self {
            target: Target::Frames(FrameDecoder::new()),
            printed: 0,
        }
    }

    fn messages(decoder: MessageDecoder) -> Self {
        Self {
            target: Target::Messages(decoder),
            printed: 0,
        }
    }

    fn feed(&mut self, chunk: &[u8], format: OutputFormat) {
        let printed = &mut self.printed;
        match &mut self.target {
            Target::Frames(decoder) => decoder.feed_with(chunk, |frame| {
                print_frame(&frame, format);
                *printed = printed.saturating_add(1);
            }),
            Target::Messages(decoder) => decoder.feed_with(chunk, |message| {
                print_message(&message, format);
                *printed = printed.saturating_add(1);
            }),
        }
    }

    fn buffered(&self) -> usize {
        match &self.target {
            Target::Frames(decoder) => decoder.buffered(),
            Target::Messages(decoder) => decoder.buffered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::DATA_INVALID;
    use opcprims_frame::ReceiverConfig;

    // Channel 1 pixels, then channel 2 pixels.
    const WIRE: [u8; 14] = [
        0x01, 0x00, 0x00, 0x03, 0x00, 0x00, 0xFF, //
        0x02, 0x00, 0x00, 0x03, 0xFF, 0x00, 0x00,
    ];

    #[test]
    fn message_stream_counts_only_accepted_messages() {
        let config = ReceiverConfig::default().with_channel(1);
        let mut stream = DecodeStream::messages(MessageDecoder::new(config));
        for chunk in WIRE.chunks(3) {
            stream.feed(chunk, OutputFormat::Json);
        }
        assert_eq!(stream.printed, 1);
        assert_eq!(stream.buffered(), 0);
    }

    #[test]
    fn frame_stream_ignores_filtering() {
        let mut stream = DecodeStream::frames();
        stream.feed(&WIRE, OutputFormat::Json);
        assert_eq!(stream.printed, 2);
    }

    #[test]
    fn partial_tail_is_reported_as_buffered() {
        let mut stream = DecodeStream::frames();
        stream.feed(&WIRE[..9], OutputFormat::Json);
        assert_eq!(stream.printed, 1);
        assert_eq!(stream.buffered(), 2);
    }

    #[test]
    fn feed_chunk_size_is_capped() {
        assert_eq!(feed_chunk_size(3), 3);
        assert_eq!(feed_chunk_size(MAX_FEED_CHUNK as u64), MAX_FEED_CHUNK);
        assert_eq!(feed_chunk_size(1 << 20), MAX_FEED_CHUNK);
        assert_eq!(feed_chunk_size(u64::MAX), MAX_FEED_CHUNK);
    }

    #[test]
    fn read_hex_accepts_spaced_text() {
        let mut input: &[u8] = b"01 00 00 03\n00 00 FF\n";
        let bytes = read_hex(&mut input).unwrap();
        assert_eq!(bytes, WIRE[..7].to_vec());
    }

    #[test]
    fn read_hex_rejects_non_utf8_and_bad_digits() {
        let mut input: &[u8] = &[0xFF, 0xFE];
        assert_eq!(read_hex(&mut input).unwrap_err().code, DATA_INVALID);

        let mut input: &[u8] = b"01 0";
        assert_eq!(read_hex(&mut input).unwrap_err().code, DATA_INVALID);
    }
}
