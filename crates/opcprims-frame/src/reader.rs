use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use crate::codec::Frame;
use crate::decoder::FrameDecoder;
use crate::dispatch::{Dispatcher, Message, ReceiverConfig};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Partial reads are reassembled internally; callers only see complete frames.
/// Frames completed by one read are queued and handed out in order.
pub struct FrameReader<T> {
    inner: T,
    decoder: FrameDecoder,
    pending: VecDeque<Frame>,
    dispatcher: Dispatcher,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default receiver configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ReceiverConfig::default())
    }

    /// Create a new frame reader with explicit receiver configuration.
    ///
    /// The configuration only affects [`read_message`](Self::read_message).
    pub fn with_config(inner: T, config: ReceiverConfig) -> Self {
        Self {
            inner,
            decoder: FrameDecoder::new(),
            pending: VecDeque::new(),
            dispatcher: Dispatcher::new(config),
        }
    }

    /// Read the next complete frame (blocking), without filtering.
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            let pending = &mut self.pending;
            self.decoder
                .feed_with(&chunk[..read], |frame| pending.push_back(frame));
        }
    }

    /// Read the next frame that passes channel and SysEx filtering (blocking).
    ///
    /// Dropped frames are consumed silently.
    pub fn read_message(&mut self) -> Result<Message> {
        loop {
            let frame = self.read_frame()?;
            if let Some(message) = self.dispatcher.dispatch(&frame) {
                return Ok(message);
            }
        }
    }

    /// Bytes of an incomplete frame held since the last read.
    pub fn buffered(&self) -> usize {
        self.decoder.buffered()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current receiver configuration.
    pub fn config(&self) -> &ReceiverConfig {
        self.dispatcher.config()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::codec::{encode_frame, encode_sysex_command, Command};
    use crate::pixels::{DataFormat, PixelData};

    #[test]
    fn read_single_frame() {
        let mut wire = BytesMut::new();
        encode_frame(1, Command::SetPixelColors, b"\x01\x02\x03", &mut wire).unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.channel, 1);
        assert_eq!(frame.payload.as_ref(), b"\x01\x02\x03");
    }

    #[test]
    fn read_multiple_frames() {
        let mut wire = BytesMut::new();
        encode_frame(1, Command::SetPixelColors, b"one", &mut wire).unwrap();
        encode_frame(2, Command::SysEx, b"two", &mut wire).unwrap();
        encode_frame(3, 0x10u8, b"three", &mut wire).unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));

        let f1 = reader.read_frame().unwrap();
        let f2 = reader.read_frame().unwrap();
        let f3 = reader.read_frame().unwrap();

        assert_eq!((f1.channel, f1.payload.as_ref()), (1, b"one".as_ref()));
        assert_eq!((f2.channel, f2.command), (2, Command::SysEx));
        assert_eq!((f3.channel, f3.command), (3, Command::Other(0x10)));
    }

    #[test]
    fn read_frame_with_max_payload() {
        let payload = vec![0xAB; u16::MAX as usize];
        let mut wire = BytesMut::new();
        encode_frame(9, Command::SetPixelColors, &payload, &mut wire).unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.channel, 9);
        assert_eq!(frame.payload.as_ref(), payload.as_slice());
    }

    #[test]
    fn partial_read_handling() {
        let mut wire = BytesMut::new();
        encode_frame(4, Command::SetPixelColors, b"slow", &mut wire).unwrap();

        let byte_reader = ByteByByteReader {
            bytes: wire.to_vec(),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.channel, 4);
        assert_eq!(frame.payload.as_ref(), b"slow");
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut partial = BytesMut::new();
        partial.put_u8(2);
        partial.put_u8(Command::SET_PIXEL_COLORS);
        partial.put_u16(16);
        partial.put_slice(b"only-part");

        let mut reader = FrameReader::new(Cursor::new(partial.to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
        assert_eq!(reader.buffered(), 13);
    }

    #[test]
    fn read_message_skips_filtered_frames() {
        let mut wire = BytesMut::new();
        encode_frame(7, Command::SetPixelColors, b"\x09\x09\x09", &mut wire).unwrap();
        encode_sysex_command(5, 0x0002, 1, b"", &mut wire).unwrap();
        encode_frame(5, Command::SetPixelColors, b"\x00\x00\xff", &mut wire).unwrap();

        let config = ReceiverConfig::default()
            .with_channel(5)
            .with_data_format(DataFormat::IntArray);
        let mut reader = FrameReader::with_config(Cursor::new(wire.to_vec()), config);

        let message = reader.read_message().unwrap();
        assert_eq!(
            message,
            Message::SetPixelColors {
                channel: 5,
                pixels: PixelData::IntArray(vec![0x0000FF]),
            }
        );
        assert!(matches!(
            reader.read_message(),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            if buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    #[cfg(unix)]
    fn roundtrip_over_pipe() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = crate::writer::FrameWriter::new(left);
        let mut reader = FrameReader::new(right);

        writer.send(1, Command::SetPixelColors, b"\x01\x02\x03").unwrap();
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.channel, 1);
        assert_eq!(frame.payload.as_ref(), b"\x01\x02\x03");
    }

    #[test]
    #[cfg(unix)]
    fn concurrent_reader_writer_threads() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = crate::writer::FrameWriter::new(left);
        let mut reader = FrameReader::new(right);

        let reader_thread = std::thread::spawn(move || {
            for expected in 0..64u8 {
                let frame = reader.read_frame().unwrap();
                assert_eq!(frame.channel, expected % 5);
                assert_eq!(frame.payload.as_ref(), format!("msg-{expected}").as_bytes());
            }
        });

        for i in 0..64u8 {
            let payload = format!("msg-{i}");
            writer
                .send(i % 5, Command::SetPixelColors, payload.as_bytes())
                .unwrap();
        }

        reader_thread.join().unwrap();
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        assert_eq!(reader.config(), &ReceiverConfig::default());
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    #[test]
    fn read_error_propagates_io_error() {
        let mut framed = FrameReader::new(WouldBlockReader);
        let err = framed.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    struct WouldBlockReader;

    impl Read for WouldBlockReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }
    }

    #[test]
    fn interrupted_read_retries() {
        let mut wire = BytesMut::new();
        encode_frame(8, Command::SetPixelColors, b"ok!", &mut wire).unwrap();

        let reader = InterruptedThenData {
            state: 0,
            bytes: wire.to_vec(),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let frame = framed.read_frame().unwrap();

        assert_eq!(frame.channel, 8);
        assert_eq!(frame.payload.as_ref(), b"ok!");
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
